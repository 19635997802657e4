//! The order resource kind: domain model and JSON codec.
//!
//! An order is one or more pizzas plus a pickup time. The wire document uses
//! camelCase field names and PascalCase enum values; enum values are matched
//! case-sensitively against their closed sets.
//!
//! ```json
//! {
//!   "id": "8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f",
//!   "pizzas": [
//!     {"size": "Medium", "toppings": [{"kind": "Cheese", "amount": "Extra"}]}
//!   ],
//!   "pickupTime": "2026-08-06T18:30:00Z"
//! }
//! ```
//!
//! [`OrderCodec`] validates applicatively: every field is checked
//! independently and all failures are collected, so a client sees the full
//! list of problems in one response rather than one problem per round trip.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{ApiResource, ResourceCodec, ResourceId};
use crate::error::ApiError;

/// A pizza order: the resource exposed over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: ResourceId,
    pub pizzas: Vec<Pizza>,
    pub pickup_time: DateTime<Utc>,
}

/// One line item of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pizza {
    pub size: Size,
    pub toppings: Vec<Topping>,
}

/// A topping choice on a pizza.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topping {
    pub kind: ToppingKind,
    pub amount: ToppingAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub const ALLOWED: &'static str = "Small, Medium, Large";

    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Small" => Some(Size::Small),
            "Medium" => Some(Size::Medium),
            "Large" => Some(Size::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToppingKind {
    Cheese,
    Pepperoni,
    Mushrooms,
    Onions,
    Pineapple,
}

impl ToppingKind {
    pub const ALLOWED: &'static str = "Cheese, Pepperoni, Mushrooms, Onions, Pineapple";

    pub fn as_str(&self) -> &'static str {
        match self {
            ToppingKind::Cheese => "Cheese",
            ToppingKind::Pepperoni => "Pepperoni",
            ToppingKind::Mushrooms => "Mushrooms",
            ToppingKind::Onions => "Onions",
            ToppingKind::Pineapple => "Pineapple",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Cheese" => Some(ToppingKind::Cheese),
            "Pepperoni" => Some(ToppingKind::Pepperoni),
            "Mushrooms" => Some(ToppingKind::Mushrooms),
            "Onions" => Some(ToppingKind::Onions),
            "Pineapple" => Some(ToppingKind::Pineapple),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToppingAmount {
    Light,
    Normal,
    Extra,
}

impl ToppingAmount {
    pub const ALLOWED: &'static str = "Light, Normal, Extra";

    pub fn as_str(&self) -> &'static str {
        match self {
            ToppingAmount::Light => "Light",
            ToppingAmount::Normal => "Normal",
            ToppingAmount::Extra => "Extra",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Light" => Some(ToppingAmount::Light),
            "Normal" => Some(ToppingAmount::Normal),
            "Extra" => Some(ToppingAmount::Extra),
            _ => None,
        }
    }
}

impl ApiResource for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> ResourceId {
        self.id
    }
}

/// JSON codec for [`Order`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderCodec;

impl OrderCodec {
    /// Validate one element of the `pizzas` array. Field errors are pushed
    /// onto `errors`; `None` means the element could not be represented.
    fn pizza(index: usize, value: &Value, errors: &mut Vec<ApiError>) -> Option<Pizza> {
        let path = format!("pizzas[{index}]");
        let Some(obj) = value.as_object() else {
            errors.push(ApiError::invalid_field(&path, "must be an object"));
            return None;
        };

        let size = match obj.get("size") {
            None => {
                errors.push(ApiError::invalid_field(format!("{path}.size"), "is required"));
                None
            }
            Some(Value::String(raw)) => match Size::parse(raw) {
                Some(size) => Some(size),
                None => {
                    errors.push(ApiError::invalid_field(
                        format!("{path}.size"),
                        format!("has invalid value '{raw}', allowed values: {}", Size::ALLOWED),
                    ));
                    None
                }
            },
            Some(_) => {
                errors.push(ApiError::invalid_field(format!("{path}.size"), "must be a string"));
                None
            }
        };

        let toppings = match obj.get("toppings") {
            // Toppings are optional; a plain pizza is a valid pizza.
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(t, item)| Self::topping(&path, t, item, errors))
                .collect(),
            Some(_) => {
                errors.push(ApiError::invalid_field(
                    format!("{path}.toppings"),
                    "must be an array",
                ));
                Vec::new()
            }
        };

        Some(Pizza { size: size?, toppings })
    }

    fn topping(
        pizza_path: &str,
        index: usize,
        value: &Value,
        errors: &mut Vec<ApiError>,
    ) -> Option<Topping> {
        let path = format!("{pizza_path}.toppings[{index}]");
        let Some(obj) = value.as_object() else {
            errors.push(ApiError::invalid_field(&path, "must be an object"));
            return None;
        };

        let kind = Self::closed_set_field(obj, &path, "kind", ToppingKind::ALLOWED, errors, ToppingKind::parse);
        let amount = Self::closed_set_field(obj, &path, "amount", ToppingAmount::ALLOWED, errors, ToppingAmount::parse);

        Some(Topping {
            kind: kind?,
            amount: amount?,
        })
    }

    /// Validate a required string field against a closed value set.
    fn closed_set_field<T>(
        obj: &Map<String, Value>,
        parent: &str,
        name: &str,
        allowed: &str,
        errors: &mut Vec<ApiError>,
        parse: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let path = format!("{parent}.{name}");
        match obj.get(name) {
            None => {
                errors.push(ApiError::invalid_field(path, "is required"));
                None
            }
            Some(Value::String(raw)) => match parse(raw) {
                Some(parsed) => Some(parsed),
                None => {
                    errors.push(ApiError::invalid_field(
                        path,
                        format!("has invalid value '{raw}', allowed values: {allowed}"),
                    ));
                    None
                }
            },
            Some(_) => {
                errors.push(ApiError::invalid_field(path, "must be a string"));
                None
            }
        }
    }
}

impl ResourceCodec<Order> for OrderCodec {
    fn deserialize(&self, id: ResourceId, document: &Value) -> Result<Order, ApiError> {
        let Some(obj) = document.as_object() else {
            return Err(ApiError::invalid_json_body("Request body must be a JSON object"));
        };

        let mut errors = Vec::new();

        // The route id is authoritative; a body id is allowed but must agree.
        if let Some(body_id) = obj.get("id") {
            let matches = body_id
                .as_str()
                .and_then(|raw| ResourceId::parse(raw).ok())
                .is_some_and(|parsed| parsed == id);
            if !matches {
                errors.push(ApiError::invalid_field(
                    "id",
                    "must match the id in the request route",
                ));
            }
        }

        let pizzas = match obj.get("pizzas") {
            None => {
                errors.push(ApiError::invalid_field("pizzas", "is required"));
                Vec::new()
            }
            Some(Value::Array(items)) if items.is_empty() => {
                errors.push(ApiError::invalid_field(
                    "pizzas",
                    "must contain at least one pizza",
                ));
                Vec::new()
            }
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| Self::pizza(index, item, &mut errors))
                .collect(),
            Some(_) => {
                errors.push(ApiError::invalid_field("pizzas", "must be an array"));
                Vec::new()
            }
        };

        let pickup_time = match obj.get("pickupTime") {
            None => {
                errors.push(ApiError::invalid_field("pickupTime", "is required"));
                None
            }
            Some(Value::String(raw)) => match DateTime::parse_from_rfc3339(raw) {
                Ok(parsed) => Some(parsed.with_timezone(&Utc)),
                Err(_) => {
                    errors.push(ApiError::invalid_field(
                        "pickupTime",
                        format!("must be an RFC 3339 timestamp, got '{raw}'"),
                    ));
                    None
                }
            },
            Some(_) => {
                errors.push(ApiError::invalid_field("pickupTime", "must be a string"));
                None
            }
        };

        match (pickup_time, errors.is_empty()) {
            (Some(pickup_time), true) => Ok(Order {
                id,
                pizzas,
                pickup_time,
            }),
            _ => Err(ApiError::invalid_json_body("The request body failed validation")
                .with_details(errors)),
        }
    }

    fn serialize(&self, order: &Order) -> Value {
        json!({
            "id": order.id,
            "pizzas": order
                .pizzas
                .iter()
                .map(|pizza| json!({
                    "size": pizza.size,
                    "toppings": pizza
                        .toppings
                        .iter()
                        .map(|topping| json!({
                            "kind": topping.kind,
                            "amount": topping.amount,
                        }))
                        .collect::<Vec<_>>(),
                }))
                .collect::<Vec<_>>(),
            "pickupTime": order.pickup_time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn order_id() -> ResourceId {
        ResourceId::parse("8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f").unwrap()
    }

    fn valid_document() -> Value {
        json!({
            "pizzas": [
                {"size": "Medium", "toppings": [{"kind": "Cheese", "amount": "Extra"}]},
                {"size": "Large"}
            ],
            "pickupTime": "2026-08-06T18:30:00Z"
        })
    }

    #[test]
    fn deserializes_a_valid_document() {
        let order = OrderCodec.deserialize(order_id(), &valid_document()).unwrap();
        assert_eq!(order.id, order_id());
        assert_eq!(order.pizzas.len(), 2);
        assert_eq!(order.pizzas[0].size, Size::Medium);
        assert_eq!(
            order.pizzas[0].toppings,
            vec![Topping {
                kind: ToppingKind::Cheese,
                amount: ToppingAmount::Extra
            }]
        );
        // Missing toppings field means a plain pizza.
        assert!(order.pizzas[1].toppings.is_empty());
    }

    #[test]
    fn collects_every_field_failure() {
        let document = json!({
            "pizzas": [{"size": "Huge", "toppings": [{"kind": "Anchovy"}]}],
            "pickupTime": "next tuesday"
        });
        let err = OrderCodec.deserialize(order_id(), &document).unwrap_err();
        let messages: Vec<&str> = err.details.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 4, "{messages:?}");
        assert!(messages.iter().any(|m| m.contains("'pizzas[0].size'") && m.contains("'Huge'")));
        assert!(messages.iter().any(|m| m.contains("'pizzas[0].toppings[0].kind'")
            && m.contains("'Anchovy'")
            && m.contains(ToppingKind::ALLOWED)));
        assert!(messages.iter().any(|m| m.contains("'pizzas[0].toppings[0].amount' is required")));
        assert!(messages.iter().any(|m| m.contains("'pickupTime'") && m.contains("next tuesday")));
    }

    #[test]
    fn empty_pizza_list_is_a_validation_failure() {
        let document = json!({"pizzas": [], "pickupTime": "2026-08-06T18:30:00Z"});
        let err = OrderCodec.deserialize(order_id(), &document).unwrap_err();
        assert_eq!(err.details.len(), 1);
        assert!(err.details[0].message.contains("at least one pizza"));
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let err = OrderCodec.deserialize(order_id(), &json!({})).unwrap_err();
        let messages: Vec<&str> = err.details.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains(&"'pizzas' is required"));
        assert!(messages.contains(&"'pickupTime' is required"));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = OrderCodec.deserialize(order_id(), &json!([1, 2, 3])).unwrap_err();
        assert!(err.message.contains("JSON object"));
    }

    #[test]
    fn matching_body_id_is_accepted() {
        let mut document = valid_document();
        document["id"] = json!(order_id().to_string());
        assert!(OrderCodec.deserialize(order_id(), &document).is_ok());
    }

    #[test]
    fn mismatched_body_id_is_rejected() {
        let mut document = valid_document();
        document["id"] = json!(Uuid::new_v4().to_string());
        let err = OrderCodec.deserialize(order_id(), &document).unwrap_err();
        assert!(err.details[0].message.contains("must match the id in the request route"));
    }

    #[test]
    fn enum_matching_is_case_sensitive() {
        let mut document = valid_document();
        document["pizzas"][0]["size"] = json!("medium");
        let err = OrderCodec.deserialize(order_id(), &document).unwrap_err();
        assert!(err.details[0].message.contains("'medium'"));
        assert!(err.details[0].message.contains(Size::ALLOWED));
    }

    #[test]
    fn offset_timestamps_normalize_to_utc() {
        let mut document = valid_document();
        document["pickupTime"] = json!("2026-08-06T20:30:00+02:00");
        let order = OrderCodec.deserialize(order_id(), &document).unwrap();
        assert_eq!(
            order.pickup_time,
            "2026-08-06T18:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    fn size_strategy() -> impl Strategy<Value = Size> {
        prop_oneof![Just(Size::Small), Just(Size::Medium), Just(Size::Large)]
    }

    fn topping_strategy() -> impl Strategy<Value = Topping> {
        (
            prop_oneof![
                Just(ToppingKind::Cheese),
                Just(ToppingKind::Pepperoni),
                Just(ToppingKind::Mushrooms),
                Just(ToppingKind::Onions),
                Just(ToppingKind::Pineapple),
            ],
            prop_oneof![
                Just(ToppingAmount::Light),
                Just(ToppingAmount::Normal),
                Just(ToppingAmount::Extra),
            ],
        )
            .prop_map(|(kind, amount)| Topping { kind, amount })
    }

    fn order_strategy() -> impl Strategy<Value = Order> {
        (
            any::<[u8; 16]>(),
            prop::collection::vec(
                (size_strategy(), prop::collection::vec(topping_strategy(), 0..4))
                    .prop_map(|(size, toppings)| Pizza { size, toppings }),
                1..4,
            ),
            0i64..4_102_444_800i64,
            0u32..1_000_000_000u32,
        )
            .prop_map(|(bytes, pizzas, secs, nanos)| Order {
                id: ResourceId::new(Uuid::from_bytes(bytes)),
                pizzas,
                pickup_time: DateTime::from_timestamp(secs, nanos).unwrap(),
            })
    }

    proptest! {
        #[test]
        fn round_trip_law(order in order_strategy()) {
            let document = OrderCodec.serialize(&order);
            let back = OrderCodec.deserialize(order.id(), &document).unwrap();
            prop_assert_eq!(back, order);
        }
    }
}
