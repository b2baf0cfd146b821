//! Background task status (`/v1/tasks`). Catalog writes return a task id to
//! poll here. Needs the API token.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::QueryParams;
use crate::response::{translate_shape, ResponseShape};
use crate::Client;

/// Filters for listing asynchronous jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskParameters {
    pub page: Option<u32>,
    pub results_per_page: Option<u32>,
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// e.g. `QUEUED`, `IN_PROGRESS`, `DONE`, `FAILED`.
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
}

impl TaskParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = Some(results_per_page);
        self
    }

    pub fn dates(mut self, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    fn apply_to(&self, params: &mut QueryParams) {
        params.insert_opt("page", self.page);
        params.insert_opt("num_results_per_page", self.results_per_page);
        params.insert_opt("start_date", self.start_date.as_deref());
        params.insert_opt("end_date", self.end_date.as_deref());
        params.insert_opt("status", self.status.as_deref());
        params.insert_opt("type", self.task_type.as_deref());
    }
}

pub struct Tasks<'a> {
    client: &'a Client,
}

impl<'a> Tasks<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn build_all_tasks(&self, parameters: &TaskParameters) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        parameters.apply_to(&mut params);
        let builder = self
            .client
            .service_request(HttpMethod::Get, "/v1/tasks")
            .query(params);
        self.client.finish(builder)
    }

    pub fn parse_all_tasks(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, "get_all_tasks", ResponseShape::Field("total_count"))
    }

    pub fn get_all_tasks(&self, parameters: &TaskParameters) -> Result<Value> {
        let request = self.build_all_tasks(parameters)?;
        self.client
            .execute("get_all_tasks", request, |response| self.parse_all_tasks(response))
    }

    pub fn build_task(&self, task_id: u64) -> Result<HttpRequest> {
        let builder = self
            .client
            .service_request(HttpMethod::Get, "/v1/tasks/{task_id}")
            .path_param("task_id", task_id.to_string());
        self.client.finish(builder)
    }

    pub fn parse_task(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, "get_task", ResponseShape::Field("status"))
    }

    pub fn get_task(&self, task_id: u64) -> Result<Value> {
        let request = self.build_task(task_id)?;
        self.client
            .execute("get_task", request, |response| self.parse_task(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::{client, config, responding};
    use pretty_assertions::assert_eq;

    #[test]
    fn all_tasks_filters() {
        let params = TaskParameters::new()
            .page(2)
            .results_per_page(50)
            .dates("2024-01-01", "2024-01-31")
            .status("DONE")
            .task_type("ingestion");
        let req = client().tasks().build_all_tasks(&params).unwrap();
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/v1/tasks?page=2&num_results_per_page=50\
             &start_date=2024-01-01&end_date=2024-01-31&status=DONE&type=ingestion\
             &key=k1&c=test"
        );
    }

    #[test]
    fn task_by_id_carries_basic_auth() {
        let client = responding(config().with_api_token("tok"), 200, "{}");
        let req = client.tasks().build_task(12345).unwrap();
        assert_eq!(req.url, "https://ac.cnstrc.com/v1/tasks/12345?key=k1&c=test");
        assert_eq!(req.header("authorization"), Some("Basic dG9rOg=="));
    }

    #[test]
    fn zero_total_count_is_well_formed() {
        let client = responding(config(), 200, r#"{"total_count":0,"tasks":[],"status_counts":{}}"#);
        let value = client.tasks().get_all_tasks(&TaskParameters::new()).unwrap();
        assert_eq!(value["total_count"], 0);
    }

    #[test]
    fn task_without_status_is_malformed() {
        let client = responding(config(), 200, r#"{"id":1}"#);
        let err = client.tasks().get_task(1).unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn task_type_is_serialized_as_type() {
        let params: TaskParameters = serde_json::from_str(r#"{"type":"ingestion"}"#).unwrap();
        assert_eq!(params.task_type.as_deref(), Some("ingestion"));
    }
}
