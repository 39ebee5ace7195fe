//! Route registration that records each operation for the OpenAPI document.
//!
//! Handlers are mounted through [`OperationBuilder`], which keeps the axum
//! route and its documentation in one place. The [`OpenApiRegistry`] collects
//! operation specs and component schemas; [`OpenApiRegistry::build_openapi`]
//! turns them into a `utoipa` document.

use std::collections::BTreeMap;

use axum::Router;
use axum::handler::Handler;
use axum::http::StatusCode;
use axum::routing::{MethodFilter, MethodRouter, on};
use parking_lot::Mutex;
use utoipa::openapi::{
    ArrayBuilder, ContentBuilder, ObjectBuilder, OpenApi, OpenApiBuilder, Ref, RefOr, Required,
    Schema,
    info::InfoBuilder,
    path::{
        HttpMethod, OperationBuilder as UOperationBuilder, ParameterBuilder, ParameterIn,
        PathItemBuilder, PathsBuilder,
    },
    request_body::RequestBodyBuilder,
    response::{ResponseBuilder, ResponsesBuilder},
    schema::{ComponentsBuilder, SchemaType, Type},
    security::{ApiKey, ApiKeyValue, SecurityRequirement, SecurityScheme},
};

use super::error::ErrorBody;

pub const SESSION_SCHEME: &str = "sessionCookie";

type SchemaCollection = Vec<(String, RefOr<Schema>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Delete => MethodFilter::DELETE,
        }
    }

    fn http_method(self) -> HttpMethod {
        match self {
            Verb::Get => HttpMethod::Get,
            Verb::Post => HttpMethod::Post,
            Verb::Put => HttpMethod::Put,
            Verb::Patch => HttpMethod::Patch,
            Verb::Delete => HttpMethod::Delete,
        }
    }
}

/// Response body shape of one documented status.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Empty,
    /// `{"data": T}`
    Data(String),
    /// `{"data": [T]}`
    DataList(String),
    /// The shared error envelope.
    Error,
}

#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub status: u16,
    pub description: String,
    pub body: ResponseBody,
}

#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub verb: Verb,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub path_params: Vec<(String, String)>,
    pub request_schema: Option<String>,
    pub responses: Vec<ResponseSpec>,
    pub requires_session: bool,
}

/// Document metadata.
#[derive(Debug, Clone)]
pub struct OpenApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

impl Default for OpenApiInfo {
    fn default() -> Self {
        Self {
            title: "DiveLog API".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            description: Some("Dive logs, plans, certifications and gear".to_owned()),
        }
    }
}

/// Collects operations and schemas while routes are registered.
pub struct OpenApiRegistry {
    cookie_name: String,
    operations: Mutex<Vec<OperationSpec>>,
    components: Mutex<BTreeMap<String, RefOr<Schema>>>,
}

impl OpenApiRegistry {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            operations: Mutex::new(Vec::new()),
            components: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn register_operation(&self, spec: OperationSpec) {
        tracing::debug!(
            method = ?spec.verb,
            path = %spec.path,
            operation_id = spec.operation_id.as_deref().unwrap_or("-"),
            "Registered API operation"
        );
        self.operations.lock().push(spec);
    }

    /// Register `T` and every schema it references; returns `T`'s component name.
    #[must_use]
    pub fn ensure_schema<T: utoipa::ToSchema + 'static>(&self) -> String {
        use utoipa::PartialSchema;

        let root_name = T::name().to_string();
        let mut collected: SchemaCollection =
            vec![(root_name.clone(), <T as PartialSchema>::schema())];
        T::schemas(&mut collected);

        let mut components = self.components.lock();
        for (name, schema) in collected {
            components.entry(name).or_insert(schema);
        }
        root_name
    }

    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.lock().len()
    }

    #[must_use]
    pub fn build_openapi(&self, info: &OpenApiInfo) -> OpenApi {
        let error_schema = self.ensure_schema::<ErrorBody>();

        let mut paths = PathsBuilder::new();
        for spec in self.operations.lock().iter() {
            let mut op = UOperationBuilder::new()
                .operation_id(spec.operation_id.clone())
                .summary(spec.summary.clone())
                .description(spec.description.clone());

            for tag in &spec.tags {
                op = op.tag(tag.clone());
            }

            for (name, description) in &spec.path_params {
                let param = ParameterBuilder::new()
                    .name(name)
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .description(Some(description.clone()))
                    .schema(Some(
                        ObjectBuilder::new()
                            .schema_type(SchemaType::Type(Type::String))
                            .format(Some(utoipa::openapi::SchemaFormat::KnownFormat(
                                utoipa::openapi::KnownFormat::Uuid,
                            )))
                            .build(),
                    ))
                    .build();
                op = op.parameter(param);
            }

            if let Some(schema_name) = &spec.request_schema {
                let content = ContentBuilder::new()
                    .schema(Some(Ref::from_schema_name(schema_name.clone())))
                    .build();
                op = op.request_body(Some(
                    RequestBodyBuilder::new()
                        .content("application/json", content)
                        .required(Some(Required::True))
                        .build(),
                ));
            }

            let mut responses = ResponsesBuilder::new();
            for r in &spec.responses {
                let schema: Option<RefOr<Schema>> = match &r.body {
                    ResponseBody::Empty => None,
                    ResponseBody::Data(name) => Some(envelope(Ref::from_schema_name(name.clone()))),
                    ResponseBody::DataList(name) => Some(envelope(
                        ArrayBuilder::new()
                            .items(Ref::from_schema_name(name.clone()))
                            .build(),
                    )),
                    ResponseBody::Error => Some(Ref::from_schema_name(error_schema.clone()).into()),
                };
                let mut resp = ResponseBuilder::new().description(&r.description);
                if let Some(schema) = schema {
                    resp = resp.content(
                        "application/json",
                        ContentBuilder::new().schema(Some(schema)).build(),
                    );
                }
                responses = responses.response(r.status.to_string(), resp.build());
            }
            op = op.responses(responses.build());

            if spec.requires_session {
                op = op.security(SecurityRequirement::new(
                    SESSION_SCHEME,
                    Vec::<String>::new(),
                ));
            }

            let item = PathItemBuilder::new()
                .operation(spec.verb.http_method(), op.build())
                .build();
            paths = paths.path(spec.path.clone(), item);
        }

        let mut components = ComponentsBuilder::new();
        for (name, schema) in self.components.lock().iter() {
            components = components.schema(name.clone(), schema.clone());
        }
        components = components.security_scheme(
            SESSION_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(self.cookie_name.clone()))),
        );

        OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title(&info.title)
                    .version(&info.version)
                    .description(info.description.clone())
                    .build(),
            )
            .paths(paths.build())
            .components(Some(components.build()))
            .build()
    }
}

fn envelope(inner: impl Into<RefOr<Schema>>) -> RefOr<Schema> {
    Schema::Object(
        ObjectBuilder::new()
            .property("data", inner)
            .required("data")
            .build(),
    )
    .into()
}

pub struct Missing;
pub struct Present(MethodRouter);

/// Builds one route and its OpenAPI operation.
pub struct OperationBuilder<H = Missing> {
    spec: OperationSpec,
    handler: H,
}

impl OperationBuilder<Missing> {
    #[must_use]
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            spec: OperationSpec {
                verb,
                path: path.into(),
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                path_params: Vec::new(),
                request_schema: None,
                responses: Vec::new(),
                requires_session: false,
            },
            handler: Missing,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Verb::Put, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Verb::Patch, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    #[must_use]
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present>
    where
        F: Handler<T, ()>,
        T: 'static,
    {
        let method_router = on(self.spec.verb.filter(), h);
        OperationBuilder {
            spec: self.spec,
            handler: Present(method_router),
        }
    }
}

impl<H> OperationBuilder<H> {
    #[must_use]
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    #[must_use]
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.spec
            .path_params
            .push((name.into(), description.into()));
        self
    }

    /// Marks the operation as needing a signed-in session and documents the 401.
    #[must_use]
    pub fn requires_session(mut self) -> Self {
        self.spec.requires_session = true;
        self.error(StatusCode::UNAUTHORIZED, "Missing, expired or invalidated session")
    }

    #[must_use]
    pub fn json_request<T: utoipa::ToSchema + 'static>(mut self, registry: &OpenApiRegistry) -> Self {
        self.spec.request_schema = Some(registry.ensure_schema::<T>());
        self
    }

    #[must_use]
    pub fn data_response<T: utoipa::ToSchema + 'static>(
        mut self,
        registry: &OpenApiRegistry,
        status: StatusCode,
        description: impl Into<String>,
    ) -> Self {
        let name = registry.ensure_schema::<T>();
        self.spec.responses.push(ResponseSpec {
            status: status.as_u16(),
            description: description.into(),
            body: ResponseBody::Data(name),
        });
        self
    }

    #[must_use]
    pub fn data_list_response<T: utoipa::ToSchema + 'static>(
        mut self,
        registry: &OpenApiRegistry,
        description: impl Into<String>,
    ) -> Self {
        let name = registry.ensure_schema::<T>();
        self.spec.responses.push(ResponseSpec {
            status: StatusCode::OK.as_u16(),
            description: description.into(),
            body: ResponseBody::DataList(name),
        });
        self
    }

    #[must_use]
    pub fn no_content(mut self, description: impl Into<String>) -> Self {
        self.spec.responses.push(ResponseSpec {
            status: StatusCode::NO_CONTENT.as_u16(),
            description: description.into(),
            body: ResponseBody::Empty,
        });
        self
    }

    #[must_use]
    pub fn error(mut self, status: StatusCode, description: impl Into<String>) -> Self {
        self.spec.responses.push(ResponseSpec {
            status: status.as_u16(),
            description: description.into(),
            body: ResponseBody::Error,
        });
        self
    }

    #[must_use]
    pub fn error_400(self) -> Self {
        self.error(StatusCode::BAD_REQUEST, "Invalid input")
    }

    #[must_use]
    pub fn error_404(self) -> Self {
        self.error(StatusCode::NOT_FOUND, "Not found or not owned by the caller")
    }

    #[must_use]
    pub fn error_409(self) -> Self {
        self.error(StatusCode::CONFLICT, "Conflicts with an existing record")
    }

    #[must_use]
    pub fn error_500(self) -> Self {
        self.error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }
}

impl OperationBuilder<Present> {
    /// Mount the handler on `router` and record the operation.
    #[must_use]
    pub fn register(self, router: Router, registry: &OpenApiRegistry) -> Router {
        let Present(method_router) = self.handler;
        let router = router.route(&self.spec.path, method_router);
        registry.register_operation(self.spec);
        router
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde::Serialize;
    use utoipa::ToSchema;

    #[derive(Serialize, ToSchema)]
    struct Widget {
        id: i32,
        name: String,
    }

    async fn widget_handler() -> &'static str {
        "ok"
    }

    fn doc_json(registry: &OpenApiRegistry) -> serde_json::Value {
        serde_json::to_value(registry.build_openapi(&OpenApiInfo::default())).unwrap()
    }

    #[test]
    fn operations_on_one_path_are_merged() {
        let registry = OpenApiRegistry::new("divelog.session-token");
        let router = OperationBuilder::get("/widgets/{id}")
            .operation_id("widgets.get")
            .path_param("id", "Widget id")
            .handler(widget_handler)
            .data_response::<Widget>(&registry, StatusCode::OK, "Widget")
            .register(Router::new(), &registry);
        let _router = OperationBuilder::delete("/widgets/{id}")
            .operation_id("widgets.delete")
            .requires_session()
            .handler(widget_handler)
            .no_content("Deleted")
            .register(router, &registry);

        let json = doc_json(&registry);
        let item = &json["paths"]["/widgets/{id}"];
        assert_eq!(item["get"]["operationId"], "widgets.get");
        assert_eq!(item["delete"]["operationId"], "widgets.delete");
        assert_eq!(item["get"]["parameters"][0]["in"], "path");
        assert!(item["get"].get("security").is_none());
        assert!(item["delete"]["security"][0].get(SESSION_SCHEME).is_some());
        assert_eq!(registry.operation_count(), 2);
    }

    #[test]
    fn data_responses_use_the_envelope() {
        let registry = OpenApiRegistry::new("divelog.session-token");
        let _router = OperationBuilder::get("/widgets")
            .handler(widget_handler)
            .data_list_response::<Widget>(&registry, "Widgets")
            .error_500()
            .register(Router::new(), &registry);

        let json = doc_json(&registry);
        let ok = &json["paths"]["/widgets"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(ok["properties"]["data"]["type"], "array");
        assert_eq!(
            ok["properties"]["data"]["items"]["$ref"],
            "#/components/schemas/Widget"
        );

        let err = &json["paths"]["/widgets"]["get"]["responses"]["500"]["content"]["application/json"]["schema"];
        assert_eq!(err["$ref"], "#/components/schemas/ErrorBody");
        assert!(json["components"]["schemas"].get("ErrorBody").is_some());
        assert_eq!(
            json["components"]["securitySchemes"][SESSION_SCHEME]["in"],
            "cookie"
        );
    }
}
