use serde::{Deserialize, Serialize};

use crate::utils::kebab_case;

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "iconName")]
    pub icon_name: String,
}

/// Body of `POST /categories`
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "iconName")]
    pub icon_name: String,
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub id: i64,
    pub name: String,
}

impl Icon {
    /// Icon with its name converted from the backend's camelCase to the
    /// kebab-case names icon sets use (`shoppingCart` -> `shopping-cart`)
    pub fn normalized(self) -> Self {
        Self {
            id: self.id,
            name: kebab_case(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let category: Category =
            serde_json::from_str(r#"{"id":3,"name":"Food","iconName":"utensils"}"#).unwrap();
        assert_eq!(category.icon_name, "utensils");

        let body = serde_json::to_value(NewCategory {
            name: "Travel".to_string(),
            icon_name: "plane".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "Travel", "iconName": "plane"}));
    }

    #[test]
    fn test_icon_normalized() {
        let icon = Icon {
            id: 1,
            name: "shoppingCart".to_string(),
        };
        assert_eq!(icon.normalized().name, "shopping-cart");
    }
}
