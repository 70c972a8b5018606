use crate::capture::gate::Category;
use crate::dom::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminator carried in the `type` field of pointer records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Click,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickType {
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "")]
    Other,
}

impl ClickType {
    pub fn from_button(button: i16) -> Self {
        match button {
            0 => ClickType::Left,
            2 => ClickType::Right,
            _ => ClickType::Other,
        }
    }
}

/// Fields shared by click and move records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerRecord {
    /// Relative to the instrumented container's top-left corner
    pub page_x: f64,
    pub page_y: f64,
    pub window_width: f64,
    pub window_height: f64,
    pub timestamp: i64,
    pub is_clickable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickable_element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "type")]
    pub kind: PointerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRecord {
    #[serde(flatten)]
    pub pointer: PointerRecord,
    pub click_type: ClickType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    #[serde(flatten)]
    pub pointer: PointerRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollRecord {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub window_width: f64,
    pub window_height: f64,
    pub timestamp: i64,
}

/// Submitted field values keyed by field name, password fields removed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord {
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
}

impl From<Location> for PageRecord {
    fn from(location: Location) -> Self {
        Self {
            url: location.url,
            title: location.title,
        }
    }
}

/// Any interaction record, serialized as its bare shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CapturedEvent {
    Click(ClickRecord),
    Move(MoveRecord),
    Scroll(ScrollRecord),
    Form(FormRecord),
}

impl CapturedEvent {
    pub fn category(&self) -> Category {
        match self {
            CapturedEvent::Click(_) => Category::Clicks,
            CapturedEvent::Move(_) => Category::Movements,
            CapturedEvent::Scroll(_) => Category::Scrolls,
            CapturedEvent::Form(_) => Category::Forms,
        }
    }
}

impl From<ClickRecord> for CapturedEvent {
    fn from(record: ClickRecord) -> Self {
        CapturedEvent::Click(record)
    }
}

impl From<MoveRecord> for CapturedEvent {
    fn from(record: MoveRecord) -> Self {
        CapturedEvent::Move(record)
    }
}

impl From<ScrollRecord> for CapturedEvent {
    fn from(record: ScrollRecord) -> Self {
        CapturedEvent::Scroll(record)
    }
}

impl From<FormRecord> for CapturedEvent {
    fn from(record: FormRecord) -> Self {
        CapturedEvent::Form(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pointer(kind: PointerKind) -> PointerRecord {
        PointerRecord {
            page_x: 10.0,
            page_y: 20.0,
            window_width: 1280.0,
            window_height: 800.0,
            timestamp: 1_700_000_000_000,
            is_clickable: false,
            clickable_element: None,
            tree: None,
            context: None,
            kind,
        }
    }

    #[test]
    fn test_click_record_wire_shape() {
        let mut base = pointer(PointerKind::Click);
        base.is_clickable = true;
        base.clickable_element = Some("button".to_string());
        base.tree = Some("html > body > button".to_string());

        let value = serde_json::to_value(CapturedEvent::from(ClickRecord {
            pointer: base,
            click_type: ClickType::Right,
        }))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "pageX": 10.0,
                "pageY": 20.0,
                "windowWidth": 1280.0,
                "windowHeight": 800.0,
                "timestamp": 1_700_000_000_000i64,
                "isClickable": true,
                "clickableElement": "button",
                "tree": "html > body > button",
                "type": "click",
                "clickType": "right",
            })
        );
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let value = serde_json::to_value(MoveRecord {
            pointer: pointer(PointerKind::Move),
        })
        .unwrap();

        let object = value.as_object().unwrap();
        assert!(!object.contains_key("clickableElement"));
        assert!(!object.contains_key("tree"));
        assert!(!object.contains_key("context"));
        assert!(!object.contains_key("clickType"));
        assert_eq!(object["type"], "move");
    }

    #[test]
    fn test_other_button_serializes_empty() {
        assert_eq!(ClickType::from_button(0), ClickType::Left);
        assert_eq!(ClickType::from_button(2), ClickType::Right);
        assert_eq!(ClickType::from_button(1), ClickType::Other);
        assert_eq!(serde_json::to_value(ClickType::Other).unwrap(), json!(""));
    }

    #[test]
    fn test_form_record_is_a_plain_map() {
        let mut record = FormRecord::default();
        record.fields.insert("email".to_string(), "a@b.c".to_string());
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"email": "a@b.c"}));
    }
}
