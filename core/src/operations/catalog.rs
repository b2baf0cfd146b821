//! Catalog management.
//!
//! Bulk replacement by CSV upload (`/v1/catalog`), item and variation CRUD
//! (`/v2/items`, `/v2/variations`) and item groups (`/v1/item_groups`).
//! Uploads are multipart bodies whose file parts are streamed from disk by
//! the transport. Everything else is JSON.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::require_ids;
use crate::error::{Error, Result};
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, PartSource};
use crate::params::QueryParams;
use crate::request::RequestBuilder;
use crate::response::translate;
use crate::Client;

/// Query options accepted by every catalog write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogWriteOptions {
    pub section: Option<String>,
    /// Receives an email if the resulting task fails.
    pub notification_email: Option<String>,
    /// Process even if the change would invalidate a large share of items.
    pub force: Option<bool>,
}

impl CatalogWriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn notification_email(mut self, email: impl Into<String>) -> Self {
        self.notification_email = Some(email.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    fn apply_to(&self, params: &mut QueryParams) {
        params.insert_opt("section", self.section.as_deref());
        params.insert_opt("notification_email", self.notification_email.as_deref());
        params.insert_opt("force", self.force);
    }
}

/// CSV files for a bulk catalog upload. At least one must be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFiles {
    pub items: Option<PartSource>,
    pub variations: Option<PartSource>,
    pub item_groups: Option<PartSource>,
}

impl CatalogFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, source: PartSource) -> Self {
        self.items = Some(source);
        self
    }

    pub fn items_file(self, path: impl Into<PathBuf>) -> Self {
        self.items(PartSource::File(path.into()))
    }

    pub fn variations(mut self, source: PartSource) -> Self {
        self.variations = Some(source);
        self
    }

    pub fn variations_file(self, path: impl Into<PathBuf>) -> Self {
        self.variations(PartSource::File(path.into()))
    }

    pub fn item_groups(mut self, source: PartSource) -> Self {
        self.item_groups = Some(source);
        self
    }

    pub fn item_groups_file(self, path: impl Into<PathBuf>) -> Self {
        self.item_groups(PartSource::File(path.into()))
    }

    fn into_form(self) -> Result<MultipartForm> {
        let mut form = MultipartForm::new();
        for (name, source) in [
            ("items", self.items),
            ("variations", self.variations),
            ("item_groups", self.item_groups),
        ] {
            let Some(source) = source else { continue };
            if let PartSource::File(path) = &source {
                if !path.is_file() {
                    return Err(Error::Validation(format!(
                        "{name} file does not exist: {}",
                        path.display()
                    )));
                }
            }
            form.push(FormPart::csv(name, format!("{name}.csv"), source));
        }
        if form.is_empty() {
            return Err(Error::Validation(
                "at least one of items, variations or item_groups is required".to_string(),
            ));
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrieveItemsQuery {
    /// Sent as repeated `id`.
    pub ids: Vec<String>,
    pub section: Option<String>,
    pub page: Option<u32>,
    pub results_per_page: Option<u32>,
}

impl RetrieveItemsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = Some(results_per_page);
        self
    }

    fn apply_to(&self, params: &mut QueryParams) {
        params.insert("id", self.ids.clone());
        params.insert_opt("section", self.section.as_deref());
        params.insert_opt("page", self.page);
        params.insert_opt("num_results_per_page", self.results_per_page);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrieveVariationsQuery {
    pub ids: Vec<String>,
    /// Only variations of this parent item.
    pub item_id: Option<String>,
    pub section: Option<String>,
    pub page: Option<u32>,
    pub results_per_page: Option<u32>,
}

impl RetrieveVariationsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    pub fn item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = Some(results_per_page);
        self
    }

    fn apply_to(&self, params: &mut QueryParams) {
        params.insert("id", self.ids.clone());
        params.insert_opt("item_id", self.item_id.as_deref());
        params.insert_opt("section", self.section.as_deref());
        params.insert_opt("page", self.page);
        params.insert_opt("num_results_per_page", self.results_per_page);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemGroupsQuery {
    pub section: Option<String>,
    pub page: Option<u32>,
    pub results_per_page: Option<u32>,
}

impl ItemGroupsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = Some(results_per_page);
        self
    }

    fn apply_to(&self, params: &mut QueryParams) {
        params.insert_opt("section", self.section.as_deref());
        params.insert_opt("page", self.page);
        params.insert_opt("num_results_per_page", self.results_per_page);
    }
}

/// Which JSON collection an operation writes to.
#[derive(Clone, Copy)]
enum Collection {
    Items,
    Variations,
}

impl Collection {
    fn template(self) -> &'static str {
        match self {
            Collection::Items => "/v2/items",
            Collection::Variations => "/v2/variations",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Collection::Items => "items",
            Collection::Variations => "variations",
        }
    }
}

pub struct Catalog<'a> {
    client: &'a Client,
}

impl<'a> Catalog<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn write_params(&self, options: &CatalogWriteOptions) -> QueryParams {
        let mut params = QueryParams::new();
        options.apply_to(&mut params);
        self.client.default_section(&mut params);
        params
    }

    fn run(&self, operation: &'static str, request: HttpRequest) -> Result<Value> {
        self.client
            .execute(operation, request, |response| self.parse(response))
    }

    /// Catalog responses are returned as-is; most are task descriptors
    /// (`task_id`, `task_status_path`) to poll through `tasks`.
    pub fn parse(&self, response: &HttpResponse) -> Result<Value> {
        translate(response)
    }

    fn build_upload(
        &self,
        method: HttpMethod,
        files: CatalogFiles,
        options: &CatalogWriteOptions,
        patch_delta: bool,
    ) -> Result<HttpRequest> {
        let form = files.into_form()?;
        let mut params = self.write_params(options);
        if patch_delta {
            params.insert("patch_delta", true);
        }
        let builder = self
            .client
            .service_request(method, "/v1/catalog")
            .query(params)
            .multipart(form);
        self.client.finish(builder)
    }

    /// Replace the whole catalog with the uploaded files.
    pub fn build_replace_catalog(
        &self,
        files: CatalogFiles,
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_upload(HttpMethod::Put, files, options, false)
    }

    pub fn replace_catalog(
        &self,
        files: CatalogFiles,
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_replace_catalog(files, options)?;
        self.run("replace_catalog", request)
    }

    /// Add or overwrite the uploaded records, leaving others untouched.
    pub fn build_update_catalog(
        &self,
        files: CatalogFiles,
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_upload(HttpMethod::Patch, files, options, false)
    }

    pub fn update_catalog(&self, files: CatalogFiles, options: &CatalogWriteOptions) -> Result<Value> {
        let request = self.build_update_catalog(files, options)?;
        self.run("update_catalog", request)
    }

    /// Apply the uploaded files as a delta (`patch_delta=true`).
    pub fn build_patch_catalog(
        &self,
        files: CatalogFiles,
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_upload(HttpMethod::Patch, files, options, true)
    }

    pub fn patch_catalog(&self, files: CatalogFiles, options: &CatalogWriteOptions) -> Result<Value> {
        let request = self.build_patch_catalog(files, options)?;
        self.run("patch_catalog", request)
    }

    fn build_json_write<T: Serialize>(
        &self,
        method: HttpMethod,
        template: &'static str,
        key: &'static str,
        records: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        if records.is_empty() {
            return Err(Error::Validation(format!(
                "{key} is a required parameter and must not be empty"
            )));
        }
        let mut body = Map::new();
        body.insert(key.to_string(), serde_json::to_value(records)?);
        let builder = self
            .client
            .service_request(method, template)
            .query(self.write_params(options))
            .json_body(&body)?;
        self.client.finish(builder)
    }

    fn build_delete<S: AsRef<str>>(
        &self,
        collection: Collection,
        ids: &[S],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        let records: Vec<Value> = require_ids(collection.key(), ids)?
            .into_iter()
            .map(|id| json!({ "id": id }))
            .collect();
        self.build_json_write(
            HttpMethod::Delete,
            collection.template(),
            collection.key(),
            &records,
            options,
        )
    }

    fn retrieve_builder(&self, template: &'static str, params: QueryParams) -> RequestBuilder {
        let mut params = params;
        self.client.default_section(&mut params);
        self.client
            .service_request(HttpMethod::Get, template)
            .query(params)
    }

    pub fn build_create_or_replace_items<T: Serialize>(
        &self,
        items: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        let collection = Collection::Items;
        self.build_json_write(HttpMethod::Put, collection.template(), collection.key(), items, options)
    }

    pub fn create_or_replace_items<T: Serialize>(
        &self,
        items: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_create_or_replace_items(items, options)?;
        self.run("create_or_replace_items", request)
    }

    pub fn build_update_items<T: Serialize>(
        &self,
        items: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        let collection = Collection::Items;
        self.build_json_write(HttpMethod::Patch, collection.template(), collection.key(), items, options)
    }

    pub fn update_items<T: Serialize>(
        &self,
        items: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_update_items(items, options)?;
        self.run("update_items", request)
    }

    pub fn build_delete_items<S: AsRef<str>>(
        &self,
        ids: &[S],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_delete(Collection::Items, ids, options)
    }

    pub fn delete_items<S: AsRef<str>>(
        &self,
        ids: &[S],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_delete_items(ids, options)?;
        self.run("delete_items", request)
    }

    pub fn build_retrieve_items(&self, query: &RetrieveItemsQuery) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        query.apply_to(&mut params);
        self.client
            .finish(self.retrieve_builder(Collection::Items.template(), params))
    }

    pub fn retrieve_items(&self, query: &RetrieveItemsQuery) -> Result<Value> {
        let request = self.build_retrieve_items(query)?;
        self.run("retrieve_items", request)
    }

    pub fn build_create_or_replace_variations<T: Serialize>(
        &self,
        variations: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        let collection = Collection::Variations;
        self.build_json_write(
            HttpMethod::Put,
            collection.template(),
            collection.key(),
            variations,
            options,
        )
    }

    pub fn create_or_replace_variations<T: Serialize>(
        &self,
        variations: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_create_or_replace_variations(variations, options)?;
        self.run("create_or_replace_variations", request)
    }

    pub fn build_update_variations<T: Serialize>(
        &self,
        variations: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        let collection = Collection::Variations;
        self.build_json_write(
            HttpMethod::Patch,
            collection.template(),
            collection.key(),
            variations,
            options,
        )
    }

    pub fn update_variations<T: Serialize>(
        &self,
        variations: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_update_variations(variations, options)?;
        self.run("update_variations", request)
    }

    pub fn build_delete_variations<S: AsRef<str>>(
        &self,
        ids: &[S],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_delete(Collection::Variations, ids, options)
    }

    pub fn delete_variations<S: AsRef<str>>(
        &self,
        ids: &[S],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_delete_variations(ids, options)?;
        self.run("delete_variations", request)
    }

    pub fn build_retrieve_variations(&self, query: &RetrieveVariationsQuery) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        query.apply_to(&mut params);
        self.client
            .finish(self.retrieve_builder(Collection::Variations.template(), params))
    }

    pub fn retrieve_variations(&self, query: &RetrieveVariationsQuery) -> Result<Value> {
        let request = self.build_retrieve_variations(query)?;
        self.run("retrieve_variations", request)
    }

    /// Insert new item groups. Existing ids are rejected by the service.
    pub fn build_create_item_groups<T: Serialize>(
        &self,
        item_groups: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_json_write(HttpMethod::Post, "/v1/item_groups", "item_groups", item_groups, options)
    }

    pub fn create_item_groups<T: Serialize>(
        &self,
        item_groups: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_create_item_groups(item_groups, options)?;
        self.run("create_item_groups", request)
    }

    /// Replace every item group; groups not listed are deleted.
    pub fn build_create_or_replace_item_groups<T: Serialize>(
        &self,
        item_groups: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_json_write(HttpMethod::Put, "/v1/item_groups", "item_groups", item_groups, options)
    }

    pub fn create_or_replace_item_groups<T: Serialize>(
        &self,
        item_groups: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_create_or_replace_item_groups(item_groups, options)?;
        self.run("create_or_replace_item_groups", request)
    }

    pub fn build_create_or_update_item_groups<T: Serialize>(
        &self,
        item_groups: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<HttpRequest> {
        self.build_json_write(HttpMethod::Patch, "/v1/item_groups", "item_groups", item_groups, options)
    }

    pub fn create_or_update_item_groups<T: Serialize>(
        &self,
        item_groups: &[T],
        options: &CatalogWriteOptions,
    ) -> Result<Value> {
        let request = self.build_create_or_update_item_groups(item_groups, options)?;
        self.run("create_or_update_item_groups", request)
    }

    pub fn build_retrieve_item_groups(&self, query: &ItemGroupsQuery) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        query.apply_to(&mut params);
        self.client
            .finish(self.retrieve_builder("/v1/item_groups", params))
    }

    pub fn retrieve_item_groups(&self, query: &ItemGroupsQuery) -> Result<Value> {
        let request = self.build_retrieve_item_groups(query)?;
        self.run("retrieve_item_groups", request)
    }

    pub fn build_retrieve_item_group(
        &self,
        item_group_id: &str,
        query: &ItemGroupsQuery,
    ) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        query.apply_to(&mut params);
        let builder = self
            .retrieve_builder("/v1/item_groups/{item_group_id}", params)
            .path_param("item_group_id", item_group_id);
        self.client.finish(builder)
    }

    pub fn retrieve_item_group(&self, item_group_id: &str, query: &ItemGroupsQuery) -> Result<Value> {
        let request = self.build_retrieve_item_group(item_group_id, query)?;
        self.run("retrieve_item_group", request)
    }

    /// Delete every item group in the section.
    pub fn build_delete_item_groups(&self, options: &CatalogWriteOptions) -> Result<HttpRequest> {
        let builder = self
            .client
            .service_request(HttpMethod::Delete, "/v1/item_groups")
            .query(self.write_params(options));
        self.client.finish(builder)
    }

    pub fn delete_item_groups(&self, options: &CatalogWriteOptions) -> Result<Value> {
        let request = self.build_delete_item_groups(options)?;
        self.run("delete_item_groups", request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Body;
    use crate::operations::testing::client;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn json_body(request: &HttpRequest) -> Value {
        match &request.body {
            Some(Body::Json(body)) => serde_json::from_str(body).unwrap(),
            other => panic!("expected a JSON body, got {other:?}"),
        }
    }

    #[test]
    fn replace_catalog_uploads_csv_parts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "id,item_name\n1,Drill\n").unwrap();

        let files = CatalogFiles::new()
            .items_file(file.path())
            .variations(PartSource::Text("id,item_id\nv1,1\n".to_string()));
        let options = CatalogWriteOptions::new()
            .section("Products")
            .notification_email("ops@example.com")
            .force(true);

        let req = client().catalog().build_replace_catalog(files, &options).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/v1/catalog?section=Products\
             &notification_email=ops%40example.com&force=true&key=k1&c=test"
        );
        let Some(Body::Multipart(form)) = &req.body else {
            panic!("expected multipart body");
        };
        let names: Vec<_> = form.parts.iter().map(|part| part.name.as_str()).collect();
        assert_eq!(names, vec!["items", "variations"]);
        assert!(req
            .header("content-type")
            .unwrap()
            .starts_with("multipart/form-data; boundary=cnstrc-"));

        let body = String::from_utf8(form.to_bytes().unwrap()).unwrap();
        assert!(body.contains("filename=\"items.csv\""));
        assert!(body.contains("1,Drill"));
    }

    #[test]
    fn patch_catalog_sets_patch_delta() {
        let files = CatalogFiles::new().item_groups(PartSource::Bytes(b"id,name\n".to_vec()));
        let req = client()
            .catalog()
            .build_patch_catalog(files, &CatalogWriteOptions::new())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(
            req.url,
            "https://ac.cnstrc.com/v1/catalog?patch_delta=true&key=k1&c=test"
        );

        let files = CatalogFiles::new().items(PartSource::Bytes(b"id\n".to_vec()));
        let req = client()
            .catalog()
            .build_update_catalog(files, &CatalogWriteOptions::new())
            .unwrap();
        assert_eq!(req.url, "https://ac.cnstrc.com/v1/catalog?key=k1&c=test");
    }

    #[test]
    fn uploads_need_a_file() {
        let err = client()
            .catalog()
            .build_replace_catalog(CatalogFiles::new(), &CatalogWriteOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let files = CatalogFiles::new().items_file("/no/such/items.csv");
        let err = client()
            .catalog()
            .build_replace_catalog(files, &CatalogWriteOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.starts_with("items file does not exist")));
    }

    #[test]
    fn item_writes_send_json() {
        let items = vec![json!({"id": "1", "name": "Drill", "data": {"url": "/drill"}})];
        let options = CatalogWriteOptions::new().section("Products");
        let catalog_client = client();
        let catalog = catalog_client.catalog();

        let put = catalog.build_create_or_replace_items(&items, &options).unwrap();
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(put.url, "https://ac.cnstrc.com/v2/items?section=Products&key=k1&c=test");
        assert_eq!(put.header("content-type"), Some("application/json"));
        assert_eq!(json_body(&put), json!({"items": items}));

        let patch = catalog.build_update_variations(&items, &options).unwrap();
        assert_eq!(patch.method, HttpMethod::Patch);
        assert!(patch.url.starts_with("https://ac.cnstrc.com/v2/variations?"));
        assert_eq!(json_body(&patch), json!({"variations": items}));
    }

    #[test]
    fn empty_writes_are_rejected() {
        let catalog_client = client();
        let catalog = catalog_client.catalog();
        let none: Vec<Value> = Vec::new();
        let err = catalog
            .build_update_items(&none, &CatalogWriteOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "items is a required parameter and must not be empty"));
        assert!(catalog
            .build_create_item_groups(&none, &CatalogWriteOptions::new())
            .is_err());
        assert!(catalog
            .build_delete_variations::<&str>(&[], &CatalogWriteOptions::new())
            .is_err());
    }

    #[test]
    fn deletes_send_ids_in_the_body() {
        let req = client()
            .catalog()
            .build_delete_items(&["1", "2"], &CatalogWriteOptions::new())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(json_body(&req), json!({"items": [{"id": "1"}, {"id": "2"}]}));
    }

    #[test]
    fn retrieve_queries() {
        let catalog_client = client();
        let catalog = catalog_client.catalog();

        let items = catalog
            .build_retrieve_items(&RetrieveItemsQuery::new().id("10001").id("10002").page(2))
            .unwrap();
        assert_eq!(
            items.url,
            "https://ac.cnstrc.com/v2/items?id=10001&id=10002&page=2&key=k1&c=test"
        );
        assert!(items.body.is_none());

        let variations = catalog
            .build_retrieve_variations(&RetrieveVariationsQuery::new().item_id("10001").results_per_page(2))
            .unwrap();
        assert_eq!(
            variations.url,
            "https://ac.cnstrc.com/v2/variations?item_id=10001&num_results_per_page=2&key=k1&c=test"
        );

        let group = catalog
            .build_retrieve_item_group("tools/drills", &ItemGroupsQuery::new())
            .unwrap();
        assert_eq!(group.url, "https://ac.cnstrc.com/v1/item_groups/tools%2Fdrills?key=k1&c=test");
    }

    #[test]
    fn item_group_id_is_required() {
        let err = client()
            .catalog()
            .build_retrieve_item_group("", &ItemGroupsQuery::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "item_group_id is a required parameter"));
    }

    #[test]
    fn item_group_writes_use_v1() {
        let groups = vec![json!({"id": "tools", "name": "Tools"})];
        let catalog_client = client();
        let catalog = catalog_client.catalog();
        let options = CatalogWriteOptions::new();

        let post = catalog.build_create_item_groups(&groups, &options).unwrap();
        let put = catalog.build_create_or_replace_item_groups(&groups, &options).unwrap();
        let patch = catalog.build_create_or_update_item_groups(&groups, &options).unwrap();
        let delete = catalog.build_delete_item_groups(&options).unwrap();
        assert_eq!(
            [post.method, put.method, patch.method, delete.method],
            [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete]
        );
        assert_eq!(json_body(&post), json!({"item_groups": groups}));
        assert!(delete.body.is_none());
        assert_eq!(delete.url, "https://ac.cnstrc.com/v1/item_groups?key=k1&c=test");
    }
}
