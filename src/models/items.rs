use serde::{Deserialize, Serialize};

/// Furniture categories included in a move. Missing flags are false and
/// unrecognised keys are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Items {
    pub sofa_set: bool,
    pub bed: bool,
    pub dining_table: bool,
    pub wardrobe: bool,
    pub other_furniture: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    SofaSet,
    Bed,
    DiningTable,
    Wardrobe,
    OtherFurniture,
}

impl Item {
    pub const ALL: [Item; 5] = [
        Item::SofaSet,
        Item::Bed,
        Item::DiningTable,
        Item::Wardrobe,
        Item::OtherFurniture,
    ];

    /// Wire key, as used in request and stored JSON.
    pub fn key(self) -> &'static str {
        match self {
            Item::SofaSet => "sofaSet",
            Item::Bed => "bed",
            Item::DiningTable => "diningTable",
            Item::Wardrobe => "wardrobe",
            Item::OtherFurniture => "otherFurniture",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Item::SofaSet => "sofa set",
            Item::Bed => "bed",
            Item::DiningTable => "dining table",
            Item::Wardrobe => "wardrobe",
            Item::OtherFurniture => "other furniture",
        }
    }
}

impl Items {
    pub fn is_selected(&self, item: Item) -> bool {
        match item {
            Item::SofaSet => self.sofa_set,
            Item::Bed => self.bed,
            Item::DiningTable => self.dining_table,
            Item::Wardrobe => self.wardrobe,
            Item::OtherFurniture => self.other_furniture,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = Item> + '_ {
        Item::ALL.into_iter().filter(|item| self.is_selected(*item))
    }

    pub fn selected_labels(&self) -> Vec<&'static str> {
        self.selected().map(Item::label).collect()
    }

    /// Decodes the stored form. NULL or blank columns decode to no items.
    pub fn from_json(s: Option<&str>) -> Result<Self, serde_json::Error> {
        match s.map(str::trim) {
            None | Some("") => Ok(Items::default()),
            Some(s) => serde_json::from_str(s),
        }
    }

    pub fn to_json(&self) -> String {
        let flags: serde_json::Map<String, serde_json::Value> = Item::ALL
            .into_iter()
            .map(|item| (item.key().to_string(), self.is_selected(item).into()))
            .collect();
        serde_json::Value::Object(flags).to_string()
    }
}
