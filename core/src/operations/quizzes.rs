//! Quizzes, served from their own host.
//!
//! Answers are groups of option ids. Each group becomes one repeated `a`
//! parameter with its options joined by `,`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{QueryParams, UserParameters};
use crate::response::{translate_shape, ResponseShape};
use crate::Client;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizParameters {
    pub section: Option<String>,
    /// Pins the quiz version a session started with.
    pub version_id: Option<String>,
    /// One entry per answered question, each holding the selected option ids.
    pub answers: Vec<Vec<String>>,
}

impl QuizParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn answer<I>(mut self, options: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.answers
            .push(options.into_iter().map(|option| option.to_string()).collect());
        self
    }

    fn apply_to(&self, params: &mut QueryParams) {
        params.insert_opt("section", self.section.as_deref());
        params.insert_opt("version_id", self.version_id.as_deref());
        let answers: Vec<String> = self.answers.iter().map(|group| group.join(",")).collect();
        params.insert("a", answers);
    }
}

/// Question flow of a quiz, served from the quizzes host.
pub struct Quizzes<'a> {
    client: &'a Client,
}

impl<'a> Quizzes<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn build(
        &self,
        template: &'static str,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        let mut params = QueryParams::new();
        parameters.apply_to(&mut params);
        self.client.default_section(&mut params);
        user.apply_to(&mut params);

        let builder = self
            .client
            .quizzes_request(HttpMethod::Get, template)
            .path_param("quiz_id", quiz_id)
            .query(params)
            .headers(user.headers())
            .timestamp(self.client.cache_buster());
        self.client.finish(builder)
    }

    pub fn build_next_question(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        self.build("/v1/quizzes/{quiz_id}/next", quiz_id, parameters, user)
    }

    pub fn parse_next_question(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, "get_next_question", ResponseShape::Field("version_id"))
    }

    pub fn get_next_question(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_next_question(quiz_id, parameters, user)?;
        self.client.execute("get_next_question", request, |response| {
            self.parse_next_question(response)
        })
    }

    /// Final results need at least one answered question. Empty answer
    /// groups do not count.
    pub fn build_quiz_results(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: &UserParameters,
    ) -> Result<HttpRequest> {
        if parameters.answers.iter().all(|group| group.join(",").is_empty()) {
            return Err(Error::Validation(
                "answers is a required parameter and must not be empty".to_string(),
            ));
        }
        self.build("/v1/quizzes/{quiz_id}/finalize", quiz_id, parameters, user)
    }

    pub fn parse_quiz_results(&self, response: &HttpResponse) -> Result<Value> {
        translate_shape(response, "get_quiz_results", ResponseShape::Field("version_id"))
    }

    pub fn get_quiz_results(
        &self,
        quiz_id: &str,
        parameters: &QuizParameters,
        user: &UserParameters,
    ) -> Result<Value> {
        let request = self.build_quiz_results(quiz_id, parameters, user)?;
        self.client.execute("get_quiz_results", request, |response| {
            self.parse_quiz_results(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::{client, config, responding};
    use pretty_assertions::assert_eq;

    #[test]
    fn next_question_goes_to_the_quizzes_host() {
        let params = QuizParameters::new().answer([1, 2]).answer(["true"]);
        let req = client()
            .quizzes()
            .build_next_question("test-quiz", &params, &UserParameters::new())
            .unwrap();
        assert_eq!(
            req.url,
            "https://quizzes.cnstrc.com/v1/quizzes/test-quiz/next?a=1%2C2&a=true\
             &key=k1&c=test&_dt=1700000000000"
        );
    }

    #[test]
    fn quizzes_host_is_configurable() {
        let client = responding(
            config().with_quizzes_service_url("http://localhost:9000/"),
            200,
            "{}",
        );
        let params = QuizParameters::new()
            .section("Products")
            .version_id("v-1")
            .answer(["a"]);
        let req = client
            .quizzes()
            .build_quiz_results("q", &params, &UserParameters::new())
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:9000/v1/quizzes/q/finalize?section=Products&version_id=v-1\
             &a=a&key=k1&c=test&_dt=1700000000000"
        );
    }

    #[test]
    fn finalize_requires_answers() {
        let err = client()
            .quizzes()
            .build_quiz_results("q", &QuizParameters::new(), &UserParameters::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn finalize_rejects_only_empty_answer_groups() {
        let empty = QuizParameters::new()
            .answer(Vec::<String>::new())
            .answer([""]);
        let err = client()
            .quizzes()
            .build_quiz_results("q", &empty, &UserParameters::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.starts_with("answers")));

        let answered = empty.answer(["true"]);
        let req = client()
            .quizzes()
            .build_quiz_results("q", &answered, &UserParameters::new())
            .unwrap();
        assert!(req.url.contains("?a=true&"), "{}", req.url);
    }

    #[test]
    fn quiz_id_is_required() {
        let err = client()
            .quizzes()
            .build_next_question("", &QuizParameters::new(), &UserParameters::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == "quiz_id is a required parameter"));
    }

    #[test]
    fn version_id_is_required_in_responses() {
        let client = responding(config(), 200, r#"{"version_id":"v-1","next_question":{"id":1}}"#);
        let value = client
            .quizzes()
            .get_next_question("q", &QuizParameters::new(), &UserParameters::new())
            .unwrap();
        assert_eq!(value["next_question"]["id"], 1);

        let client = responding(config(), 200, r#"{"next_question":{"id":1}}"#);
        let err = client
            .quizzes()
            .get_next_question("q", &QuizParameters::new(), &UserParameters::new())
            .unwrap_err();
        assert!(matches!(err, Error::Api(api) if api.message == "get_next_question response data is malformed"));
    }
}
