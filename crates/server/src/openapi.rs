use models::coverage::{FIELDS, MAX_FIELD_LEN};
use service::auth::{TOKEN_HEADER, TOKEN_SCHEME};
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, Schema, SchemaFormat, SchemaType};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::RefOr;
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct MessageDoc {
    pub message: String,
}

#[derive(ToSchema)]
pub struct PaginationDoc {
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
    pub total: u64,
    pub current: String,
    pub first: String,
    pub last: String,
    pub prev: String,
    pub next: String,
}

#[derive(ToSchema)]
pub struct CoveragePageDoc {
    pub coverages: Vec<CoverageOut>,
    pub pagination: PaginationDoc,
}

/// Creation body: every coverage attribute, all required.
pub struct CoverageIn;

/// A stored record: `cid` plus every coverage attribute.
pub struct CoverageOut;

fn attribute_object(with_cid: bool) -> ObjectBuilder {
    let mut object = ObjectBuilder::new().schema_type(SchemaType::Object);
    if with_cid {
        object = object
            .property(
                "cid",
                ObjectBuilder::new()
                    .schema_type(SchemaType::Integer)
                    .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int32))),
            )
            .required("cid");
    }
    for def in FIELDS.iter() {
        let property = ObjectBuilder::new()
            .schema_type(SchemaType::String)
            .max_length(Some(MAX_FIELD_LEN))
            .nullable(with_cid);
        object = object.property(def.name, property);
        if !with_cid {
            object = object.required(def.name);
        }
    }
    object
}

impl<'s> ToSchema<'s> for CoverageIn {
    fn schema() -> (&'s str, RefOr<Schema>) {
        ("CoverageIn", RefOr::T(Schema::Object(attribute_object(false).build())))
    }
}

impl<'s> ToSchema<'s> for CoverageOut {
    fn schema() -> (&'s str, RefOr<Schema>) {
        ("CoverageOut", RefOr::T(Schema::Object(attribute_object(true).build())))
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                TOKEN_SCHEME,
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(TOKEN_HEADER))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Service Coverages API for Watson Assistant",
        version = "1.0.0",
        description = "Look up, list, create and delete service coverage records."
    ),
    servers(
        (url = "https://{appname}.{projectid}.{region}.codeengine.appdomain.cloud", description = "Code Engine deployment",
            variables(
                ("appname" = (default = "myapp", description = "application name")),
                ("projectid" = (default = "projectid", description = "the Code Engine project ID")),
                ("region" = (default = "us-south", description = "the deployment region, e.g., us-south"))
            )
        ),
        (url = "http://127.0.0.1:{port}", description = "local test",
            variables(
                ("port" = (default = "5000", description = "local port to use"))
            )
        )
    ),
    paths(
        crate::routes::health,
        crate::routes::coverages::get_by_gbg,
        crate::routes::coverages::get_by_name,
        crate::routes::coverages::list,
        crate::routes::coverages::create,
        crate::routes::coverages::delete,
        crate::routes::database::recreate,
    ),
    components(
        schemas(
            MessageDoc,
            PaginationDoc,
            CoveragePageDoc,
            CoverageIn,
            CoverageOut,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health"),
        (name = "coverages"),
        (name = "database")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_routes_and_security() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(doc["info"]["title"], "Service Coverages API for Watson Assistant");
        assert_eq!(doc["info"]["version"], "1.0.0");
        for path in ["/", "/coverages", "/coverages/gbg/{key}", "/coverages/name/{name}", "/database/recreate"] {
            assert!(doc["paths"].get(path).is_some(), "{path}");
        }
        let scheme = &doc["components"]["securitySchemes"]["ApiKey"];
        assert_eq!(scheme["in"], "header");
        assert_eq!(scheme["name"], "API_TOKEN");
        assert_eq!(doc["servers"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn gbg_path_is_documented_once_for_lookup_and_delete() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        let gbg_paths: Vec<&String> = paths.keys().filter(|p| p.starts_with("/coverages/gbg/")).collect();
        assert_eq!(gbg_paths, vec!["/coverages/gbg/{key}"]);
        let item = &paths["/coverages/gbg/{key}"];
        assert!(item.get("get").is_some());
        assert!(item.get("delete").is_some());
        assert_eq!(item["delete"]["parameters"][0]["name"], "key");
    }

    #[test]
    fn creation_schema_requires_every_attribute() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schema = &doc["components"]["schemas"]["CoverageIn"];
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), FIELDS.len());
        assert!(schema["properties"].get("cid").is_none());
        assert_eq!(schema["properties"]["gbg"]["maxLength"], 255);
    }
}
