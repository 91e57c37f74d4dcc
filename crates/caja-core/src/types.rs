//! # Domain Types
//!
//! Payment methods, composite components and the payload shapes exchanged
//! with the payment-methods API.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌──────────────────────┐                    │
//! │  │  PaymentMethod  │ 1    n │  CompositeComponent  │                    │
//! │  │  ─────────────  │───────►│  ──────────────────  │                    │
//! │  │  id             │        │  composite_id        │                    │
//! │  │  name           │        │  member_id ──────────┼──► SIMPLE method   │
//! │  │  kind           │        │  order (1-based)     │                    │
//! │  │  order, active  │        │  active (always 1)   │                    │
//! │  └─────────────────┘        └──────────────────────┘                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │   MethodKind    │   │  ComponentRow   │   │   MethodPayload     │   │
//! │  │  SIMPLE         │   │  (GET shape)    │   │   (POST/PUT shape)  │   │
//! │  │  COMPUESTO      │   │  medio.id |     │   │                     │   │
//! │  └─────────────────┘   │  medio_pago_id  │   └─────────────────────┘   │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! The API speaks Spanish field names (`nombre`, `orden`, `activo`, ...).
//! Rust fields use English names and map onto the wire with
//! `#[serde(rename)]`. Flags and numbers are read leniently because the
//! backend returns `activo` as `1`, `true` or `"1"` depending on the row.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

/// Identifier assigned by the payment-methods catalog.
pub type MethodId = i64;

// =============================================================================
// Method Kind
// =============================================================================

/// Whether a payment method is atomic or an alias for a group of methods.
///
/// Absent, null, non-string or unrecognized `tipo` values read as
/// [`MethodKind::Simple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
pub enum MethodKind {
    /// Cash, card, transfer...
    #[default]
    #[serde(rename = "SIMPLE")]
    Simple,
    /// Ordered combination of two or more simple methods.
    #[serde(rename = "COMPUESTO")]
    Composite,
}

impl MethodKind {
    /// Reads a `tipo` value, case-insensitively.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "COMPUESTO" | "COMPOSITE" => MethodKind::Composite,
            _ => MethodKind::Simple,
        }
    }
}

impl<'de> Deserialize<'de> for MethodKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(raw) => MethodKind::from_wire(&raw),
            _ => MethodKind::default(),
        })
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodKind::Simple => write!(f, "SIMPLE"),
            MethodKind::Composite => write!(f, "COMPUESTO"),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// A payment method as listed by `GET /medios-pago`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethod {
    #[serde(deserialize_with = "wire::id")]
    pub id: MethodId,

    /// Display name.
    #[serde(rename = "nombre", default)]
    pub name: String,

    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,

    /// Symbolic icon reference (e.g. `FaLayerGroup`).
    #[serde(rename = "icono", default)]
    pub icon: Option<String>,

    /// Default display position among active methods. Null reads as 0.
    #[serde(rename = "orden", default, deserialize_with = "wire::lenient_i64")]
    pub order: i64,

    #[serde(rename = "tipo", default)]
    pub kind: MethodKind,

    /// Inactive methods never appear in selection lists.
    #[serde(
        rename = "activo",
        default,
        deserialize_with = "wire::flag",
        serialize_with = "wire::flag_as_int"
    )]
    #[ts(type = "number")]
    pub active: bool,

    /// Surcharge/discount percentage. Composites are created with 0.
    #[serde(rename = "ajuste_porcentual", default, deserialize_with = "wire::lenient_f64")]
    pub percentage_adjustment: f64,
}

impl PaymentMethod {
    /// Returns true for active composite methods.
    #[inline]
    pub fn is_active_composite(&self) -> bool {
        self.active && self.kind == MethodKind::Composite
    }

    /// Returns true for active simple methods.
    #[inline]
    pub fn is_active_simple(&self) -> bool {
        self.active && self.kind == MethodKind::Simple
    }

    /// The text a search query is matched against: `name + " " + description`.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.name, self.description.as_deref().unwrap_or(""))
    }
}

// =============================================================================
// Composite Components
// =============================================================================

/// One member of a composite, as written by `PUT /medios-pago/{id}/componentes`.
///
/// `order` is the 1-based position in the editor's list at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompositeComponent {
    /// Owning composite. Carried in the URL, not in the body.
    #[serde(skip)]
    pub composite_id: MethodId,

    #[serde(rename = "medio_pago_id")]
    pub member_id: MethodId,

    #[serde(rename = "orden")]
    pub order: u32,

    #[serde(
        rename = "activo",
        deserialize_with = "wire::flag",
        serialize_with = "wire::flag_as_int"
    )]
    #[ts(type = "number")]
    pub active: bool,
}

/// Body of `PUT /medios-pago/{id}/componentes`: the complete ordered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComponentsPayload {
    #[serde(rename = "componentes")]
    pub components: Vec<CompositeComponent>,
}

/// Reference to a member method nested in an API row (`{ "id": 3, ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodRef {
    #[serde(default, deserialize_with = "wire::lenient_opt_i64")]
    pub id: Option<MethodId>,
}

/// A persisted component row from `GET /medios-pago/{id}/componentes`.
///
/// Depending on the backend version the member arrives nested
/// (`"medio": { "id": 3 }`) or flat (`"medio_pago_id": 3`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComponentRow {
    #[serde(rename = "orden", default, deserialize_with = "wire::lenient_opt_i64")]
    pub order: Option<i64>,

    #[serde(rename = "medio", default)]
    pub member: Option<MethodRef>,

    #[serde(rename = "medio_pago_id", default, deserialize_with = "wire::lenient_opt_i64")]
    pub member_id: Option<MethodId>,
}

impl ComponentRow {
    /// The referenced member id, preferring the nested form.
    pub fn resolved_member_id(&self) -> Option<MethodId> {
        self.member
            .as_ref()
            .and_then(|m| m.id)
            .or(self.member_id)
    }

    /// Sort key: null order sorts as 0.
    #[inline]
    pub fn sort_key(&self) -> i64 {
        self.order.unwrap_or(0)
    }
}

/// Turns persisted rows into the editor's ordered member list.
///
/// Rows are stable-sorted by `order` (null as 0); rows without any member
/// reference are skipped.
pub fn ordered_member_ids(mut rows: Vec<ComponentRow>) -> Vec<MethodId> {
    rows.sort_by_key(ComponentRow::sort_key);
    rows.iter().filter_map(ComponentRow::resolved_member_id).collect()
}

// =============================================================================
// API Payloads
// =============================================================================

/// Body of `POST /medios-pago` and `PUT /medios-pago/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodPayload {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "descripcion")]
    pub description: String,

    #[serde(rename = "icono")]
    pub icon: String,

    #[serde(rename = "orden")]
    pub order: i64,

    /// Sent on create only.
    #[serde(rename = "ajuste_porcentual", default, skip_serializing_if = "Option::is_none")]
    pub percentage_adjustment: Option<f64>,

    #[serde(rename = "tipo")]
    pub kind: MethodKind,
}

/// Response of `POST /medios-pago`.
///
/// The id is read from `medio.id`, falling back to a top-level `id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatedMethod {
    #[serde(rename = "medio", default)]
    pub method: Option<MethodRef>,

    #[serde(default, deserialize_with = "wire::lenient_opt_i64")]
    pub id: Option<MethodId>,
}

impl CreatedMethod {
    pub fn id(&self) -> Option<MethodId> {
        self.method.as_ref().and_then(|m| m.id).or(self.id)
    }
}

// =============================================================================
// Lenient Wire Readers
// =============================================================================

mod wire {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// `1`, `true` and `"1"` are true; everything else is false.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64() == Some(1.0),
            Value::String(s) => s.trim().parse::<f64>().ok() == Some(1.0),
            _ => false,
        })
    }

    pub fn flag_as_int<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    /// A required id: a number or numeric text.
    pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient_opt_i64(deserializer)?
            .ok_or_else(|| serde::de::Error::custom("expected a numeric id"))
    }

    pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(lenient_opt_i64(deserializer)?.unwrap_or(0))
    }

    pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_kind_from_wire() {
        assert_eq!(MethodKind::from_wire("COMPUESTO"), MethodKind::Composite);
        assert_eq!(MethodKind::from_wire("compuesto"), MethodKind::Composite);
        assert_eq!(MethodKind::from_wire("SIMPLE"), MethodKind::Simple);
        assert_eq!(MethodKind::from_wire("whatever"), MethodKind::Simple);
    }

    #[test]
    fn test_payment_method_lenient_fields() {
        let json = r#"[
            {"id": 1, "nombre": "Efectivo", "activo": 1, "orden": 2, "tipo": "SIMPLE"},
            {"id": 2, "nombre": "Mixto", "activo": true, "orden": null, "tipo": "compuesto",
             "ajuste_porcentual": "5.50"},
            {"id": 3, "nombre": "Viejo", "activo": "0"},
            {"id": 4, "nombre": "Sin tipo", "activo": 1, "tipo": null},
            {"id": "5", "nombre": "Raro", "activo": 1, "tipo": 2}
        ]"#;
        let methods: Vec<PaymentMethod> = serde_json::from_str(json).unwrap();

        assert!(methods[0].is_active_simple());
        assert_eq!(methods[0].order, 2);

        assert!(methods[1].is_active_composite());
        assert_eq!(methods[1].order, 0);
        assert!((methods[1].percentage_adjustment - 5.5).abs() < f64::EPSILON);

        assert!(!methods[2].active);
        assert_eq!(methods[2].kind, MethodKind::Simple);
        assert_eq!(methods[2].description, None);

        assert_eq!(methods[3].kind, MethodKind::Simple);

        assert_eq!(methods[4].id, 5);
        assert!(methods[4].is_active_simple());
    }

    #[test]
    fn test_payment_method_without_numeric_id_is_rejected() {
        let result = serde_json::from_str::<PaymentMethod>(r#"{"id": "x", "nombre": "Roto"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_component_row_member_shapes() {
        let json = r#"[
            {"orden": 2, "medio": {"id": 7, "nombre": "Tarjeta"}},
            {"orden": 1, "medio_pago_id": 5},
            {"orden": null, "medio_pago_id": 9},
            {"orden": 3},
            {"orden": "4", "medio_pago_id": "3"},
            {"orden": 5, "medio": {"id": "11"}}
        ]"#;
        let rows: Vec<ComponentRow> = serde_json::from_str(json).unwrap();

        assert_eq!(rows[0].resolved_member_id(), Some(7));
        assert_eq!(rows[1].resolved_member_id(), Some(5));
        assert_eq!(rows[3].resolved_member_id(), None);
        assert_eq!(rows[4].resolved_member_id(), Some(3));

        assert_eq!(ordered_member_ids(rows), vec![9, 5, 7, 3, 11]);
    }

    #[test]
    fn test_components_payload_wire_shape() {
        let payload = ComponentsPayload {
            components: vec![CompositeComponent {
                composite_id: 10,
                member_id: 3,
                order: 1,
                active: true,
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"componentes": [{"medio_pago_id": 3, "orden": 1, "activo": 1}]})
        );
    }

    #[test]
    fn test_method_payload_omits_adjustment_on_update() {
        let payload = MethodPayload {
            name: "Efectivo + Transferencia".into(),
            description: String::new(),
            icon: String::new(),
            order: 4,
            percentage_adjustment: None,
            kind: MethodKind::Composite,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["tipo"], "COMPUESTO");
        assert!(json.get("ajuste_porcentual").is_none());
    }

    #[test]
    fn test_created_method_id() {
        let nested: CreatedMethod = serde_json::from_str(r#"{"medio": {"id": 12}}"#).unwrap();
        assert_eq!(nested.id(), Some(12));

        let flat: CreatedMethod = serde_json::from_str(r#"{"id": 13}"#).unwrap();
        assert_eq!(flat.id(), Some(13));

        let text: CreatedMethod = serde_json::from_str(r#"{"medio": {"id": "14"}}"#).unwrap();
        assert_eq!(text.id(), Some(14));

        let none: CreatedMethod = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert_eq!(none.id(), None);
    }
}
