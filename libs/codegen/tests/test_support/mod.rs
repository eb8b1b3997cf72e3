#![allow(dead_code)]

use schemata_codegen::{GeneratedUnit, GenerationReport, MemorySink, Pipeline, GeneratorConfig};
use schemata_model::{parse_document, SchemaDocument};
use serde_json::{json, Value};

/// Orders, customers and line items with cyclic references, inheritance and
/// one-to-many relationships.
pub fn shop_json() -> Value {
    json!({
        "swagger": "2.0",
        "info": { "title": "Shop", "version": "1" },
        "definitions": {
            "Entity": {
                "type": "object",
                "x-id": "id",
                "x-type": "typeId",
                "required": ["id"],
                "properties": {
                    "id": { "type": "integer" },
                    "typeId": { "type": "integer" }
                }
            },
            "Customer": {
                "x-type-id": 2,
                "allOf": [
                    { "$ref": "#/definitions/Entity" },
                    {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string", "maxLength": 80 },
                            "email": { "type": "string" },
                            "orders": {
                                "type": "array",
                                "x-ref-key": "customerId",
                                "items": { "$ref": "#/definitions/Order" }
                            }
                        }
                    }
                ]
            },
            "Order": {
                "description": "A placed order",
                "x-type-id": 3,
                "allOf": [
                    { "$ref": "#/definitions/Entity" },
                    {
                        "type": "object",
                        "required": ["number"],
                        "properties": {
                            "number": { "type": "string", "maxLength": 20 },
                            "status": { "$ref": "#/definitions/OrderStatus", "default": 1 },
                            "customerId": { "type": "integer", "x-nullable": true },
                            "customer": {
                                "x-id": "customerId",
                                "allOf": [{ "$ref": "#/definitions/Customer" }]
                            },
                            "total": { "type": "number", "default": 0 },
                            "express": { "type": "boolean", "default": false },
                            "placed": { "type": "string", "format": "date-time" },
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
                "x-id": "id",
                "required": ["sku"],
                "properties": {
                    "id": { "type": "integer", "format": "int64" },
                    "orderId": { "type": "integer" },
                    "order": { "x-id": "orderId", "$ref": "#/definitions/Order" },
                    "sku": { "type": "string" }
                }
            },
            "OrderLog": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer" },
                    "message": { "type": "string" }
                }
            }
        },
        "paths": {
            "/api/Order/{id}": {
                "parameters": [{ "name": "id", "in": "path", "type": "integer" }],
                "get": {
                    "summary": "Fetch one order",
                    "responses": { "200": { "schema": { "$ref": "#/definitions/Order" } } }
                },
                "delete": { "responses": { "204": { "description": "deleted" } } }
            },
            "/api/Order": {
                "post": {
                    "parameters": [
                        { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/Order" } }
                    ],
                    "responses": { "200": { "schema": { "$ref": "#/definitions/Order" } } }
                }
            },
            "/api/Order/Search": {
                "get": {
                    "parameters": [
                        { "name": "take", "in": "query", "type": "integer" },
                        { "name": "status", "in": "query", "type": "string" }
                    ],
                    "responses": {
                        "200": {
                            "schema": { "type": "array", "items": { "$ref": "#/definitions/Order" } }
                        }
                    }
                }
            },
            "/api/Order/GetItemLogs/{id}": {
                "get": {
                    "parameters": [{ "name": "id", "in": "path", "type": "integer" }],
                    "responses": {
                        "200": {
                            "schema": { "type": "array", "items": { "$ref": "#/definitions/OrderLog" } }
                        }
                    }
                }
            },
            "/api/Customer/{id}/Orders": {
                "get": {
                    "parameters": [{ "name": "id", "in": "path", "type": "integer" }],
                    "responses": {
                        "200": {
                            "schema": { "type": "array", "items": { "$ref": "#/definitions/Order" } }
                        }
                    }
                }
            },
            "/api/LineItem": {
                "post": {
                    "parameters": [
                        { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/LineItem" } }
                    ],
                    "responses": { "200": { "schema": { "$ref": "#/definitions/LineItem" } } }
                }
            },
            "/api/Health": {
                "get": { "responses": { "204": { "description": "healthy" } } }
            }
        }
    })
}

pub fn shop_document() -> SchemaDocument {
    parse_document(&shop_json()).expect("shop document parses")
}

/// Run the pipeline with default settings into memory
pub fn run(document: &SchemaDocument) -> (Vec<GeneratedUnit>, GenerationReport) {
    run_with(document, GeneratorConfig::default())
}

pub fn run_with(document: &SchemaDocument, config: GeneratorConfig) -> (Vec<GeneratedUnit>, GenerationReport) {
    let mut sink = MemorySink::new();
    let report = Pipeline::new(document, config).run(&mut sink);
    (sink.into_units(), report)
}

pub fn unit<'a>(units: &'a [GeneratedUnit], name: &str) -> &'a GeneratedUnit {
    units
        .iter()
        .find(|u| u.name == name)
        .unwrap_or_else(|| panic!("no unit named {}", name))
}

pub fn names(units: &[GeneratedUnit]) -> Vec<&str> {
    units.iter().map(|u| u.name.as_str()).collect()
}

/// Source with every line trimmed, for indentation-independent assertions
pub fn flat(unit: &GeneratedUnit) -> String {
    unit.source
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
