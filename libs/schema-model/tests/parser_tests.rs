//! Parsing Swagger 2.0 and OpenAPI 3 documents into the schema model

use schemata_model::{
    parse_document, DefinitionKind, HttpMethod, ParameterLocation, PropertyType, SchemaDocument,
};
use serde_json::json;

fn swagger_document() -> serde_json::Value {
    json!({
        "swagger": "2.0",
        "info": { "title": "Shop API", "version": "1" },
        "definitions": {
            "Entity": {
                "type": "object",
                "x-id": "id",
                "x-type": "typeId",
                "required": ["id"],
                "properties": {
                    "id": { "type": "integer", "format": "int32" },
                    "typeId": { "type": "integer" }
                }
            },
            "Order": {
                "x-type-id": 3,
                "allOf": [
                    { "$ref": "#/definitions/Entity" },
                    { "$ref": "#/definitions/Ignored" },
                    {
                        "type": "object",
                        "required": ["number"],
                        "properties": {
                            "number": { "type": "string", "maxLength": 20 },
                            "status": { "$ref": "#/definitions/OrderStatus" },
                            "items": {
                                "type": "array",
                                "x-ref-key": "orderId",
                                "items": { "$ref": "#/definitions/LineItem" }
                            }
                        }
                    }
                ]
            },
            "OrderStatus": {
                "type": "integer",
                "enum": [0, 1, 2],
                "x-enumNames": ["New", "Paid", "Shipped"]
            },
            "LineItem": {
                "type": "object",
                "properties": {
                    "orderId": { "type": "integer", "x-nullable": true },
                    "order": {
                        "x-id": "orderId",
                        "allOf": [{ "$ref": "#/definitions/Order" }]
                    }
                }
            }
        },
        "parameters": {
            "Take": { "name": "take", "in": "query", "type": "integer" }
        },
        "paths": {
            "/api/Order/{id}": {
                "parameters": [
                    { "name": "id", "in": "path", "type": "integer" }
                ],
                "get": {
                    "tags": ["Order"],
                    "responses": {
                        "200": { "schema": { "$ref": "#/definitions/Order" } }
                    }
                },
                "put": {
                    "parameters": [
                        { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/Order" } },
                        { "name": "X-Trace", "in": "header", "type": "string" }
                    ],
                    "responses": { "204": { "description": "ok" } }
                }
            },
            "/api/Order/Search": {
                "get": {
                    "parameters": [
                        { "$ref": "#/parameters/Take" }
                    ],
                    "responses": {
                        "200": {
                            "schema": { "type": "array", "items": { "$ref": "#/definitions/Order" } }
                        }
                    }
                }
            }
        }
    })
}

#[test]
fn test_parse_swagger_definitions() {
    let doc = parse_document(&swagger_document()).unwrap();

    assert_eq!(doc.title.as_deref(), Some("Shop API"));
    let names: Vec<_> = doc.definitions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Entity", "Order", "OrderStatus", "LineItem"]);

    let order = doc.definition("Order").unwrap();
    assert_eq!(order.inherited.as_deref(), Some("Entity"));
    assert_eq!(order.extensions.type_id(), Some(3));
    let props: Vec<_> = order.properties.keys().map(String::as_str).collect();
    assert_eq!(props, vec!["number", "status", "items"]);

    let number = &order.properties["number"];
    assert!(number.required);
    assert_eq!(number.max_length, Some(20));

    let status = &order.properties["status"];
    assert!(status.is_enum, "reference to an enumeration is flagged");
    assert_eq!(status.reference.as_deref(), Some("OrderStatus"));

    let items = &order.properties["items"];
    assert!(items.is_reference_collection());
    assert_eq!(
        items.item.as_ref().unwrap().reference.as_deref(),
        Some("LineItem")
    );
}

#[test]
fn test_parse_enumeration_and_aliases() {
    let doc = parse_document(&swagger_document()).unwrap();

    let status = doc.definition("OrderStatus").unwrap();
    assert_eq!(status.kind, DefinitionKind::Enumeration);
    assert_eq!(status.enum_value_names(), vec!["New", "Paid", "Shipped"]);

    let line = doc.definition("LineItem").unwrap();
    let order = &line.properties["order"];
    assert_eq!(order.kind, PropertyType::None);
    assert_eq!(order.reference.as_deref(), Some("Order"));
    assert_eq!(order.extensions.id.as_deref(), Some("orderId"));
    assert_eq!(line.properties["orderId"].nullable, Some(true));
}

#[test]
fn test_inherited_lookups_through_parsed_chain() {
    let doc = parse_document(&swagger_document()).unwrap();
    let order = doc.definition("Order").unwrap();

    let (key, owner) = doc.primary_key(order).unwrap();
    assert_eq!(key.name, "id");
    assert_eq!(owner.name, "Entity");

    let (type_key, _) = doc.type_key(order).unwrap();
    assert_eq!(type_key.name, "typeId");
    assert_eq!(doc.type_id(order), Some(3));
}

#[test]
fn test_parse_operations_in_document_order() {
    let doc = parse_document(&swagger_document()).unwrap();

    let summary: Vec<_> = doc
        .operations
        .iter()
        .map(|op| (op.method, op.path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (HttpMethod::Get, "/api/Order/{id}"),
            (HttpMethod::Put, "/api/Order/{id}"),
            (HttpMethod::Get, "/api/Order/Search"),
        ]
    );

    let get = &doc.operations[0];
    assert_eq!(get.tag(), Some("Order"));
    assert_eq!(get.parameters.len(), 1);
    assert_eq!(get.parameters[0].location, ParameterLocation::Path);
    assert!(get.parameters[0].required);
    assert_eq!(
        get.response.as_ref().unwrap().reference.as_deref(),
        Some("Order")
    );

    let put = &doc.operations[1];
    let locations: Vec<_> = put.parameters.iter().map(|p| p.location).collect();
    assert_eq!(
        locations,
        vec![
            ParameterLocation::Path,
            ParameterLocation::Body,
            ParameterLocation::Header
        ]
    );
    assert!(put.response.is_none());

    let search = &doc.operations[2];
    assert_eq!(search.parameters[0].name, "take");
    assert!(search.returns_list());
}

#[test]
fn test_parse_openapi3_components_and_request_body() {
    let doc = SchemaDocument::from_json_str(
        &json!({
            "openapi": "3.0.1",
            "components": {
                "schemas": {
                    "Customer": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "nullable": true }
                        }
                    }
                }
            },
            "paths": {
                "/api/Customer": {
                    "post": {
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Customer" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Customer" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/api/Customer/Upload": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "multipart/form-data": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "file": { "type": "string", "format": "binary" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        })
        .to_string(),
    )
    .unwrap();

    let customer = doc.definition("Customer").unwrap();
    assert_eq!(customer.properties["name"].nullable, Some(true));

    let create = &doc.operations[0];
    let body = create.body_parameter().unwrap();
    assert_eq!(body.name, "body");
    assert!(body.required);
    assert_eq!(
        create.response.as_ref().unwrap().reference.as_deref(),
        Some("Customer")
    );

    let upload = &doc.operations[1];
    assert_eq!(upload.parameters.len(), 1);
    assert_eq!(upload.parameters[0].location, ParameterLocation::FormData);
    assert!(upload.parameters[0].schema.format_is("binary"));
}

#[test]
fn test_rejects_documents_without_content() {
    let err = parse_document(&json!({ "swagger": "2.0" })).unwrap_err();
    assert!(err.to_string().contains("neither schemas nor paths"));

    let err = parse_document(&json!([1, 2])).unwrap_err();
    assert!(err.to_string().contains("root must be an object"));
}
