use serde::Deserialize;

use crate::repos::traveller_repo::TravellerRecord;
use crate::services::query::{ExactValue, FilterField, Filterable, GenericFilters, Pageable, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravellerField {
    Id,
    Uuid,
    IsActive,
    /// `is_active` of the traveller's user, reached through the relation.
    UserIsActive,
}

impl FilterField for TravellerField {
    fn from_sort_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(TravellerField::Id),
            "uuid" => Some(TravellerField::Uuid),
            "isActive" => Some(TravellerField::IsActive),
            _ => None,
        }
    }
}

/// Body of the admin list endpoint: paging plus the traveller filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TravellerFilters {
    #[serde(flatten)]
    pub paging: GenericFilters,
    pub uuid: Option<String>,
    pub active: Option<bool>,
}

impl TravellerFilters {
    pub fn predicate(&self) -> Predicate<TravellerField> {
        Predicate::all([
            Predicate::contains_ignore_case(TravellerField::Uuid, self.uuid.as_deref()),
            Predicate::exact_through_relation(TravellerField::UserIsActive, self.active),
        ])
    }

    pub fn pageable(&self) -> Pageable {
        self.paging.pageable()
    }
}

impl Filterable<TravellerField> for TravellerRecord {
    fn text(&self, field: TravellerField) -> Option<&str> {
        match field {
            TravellerField::Uuid => Some(&self.uuid),
            _ => None,
        }
    }

    fn exact(&self, field: TravellerField) -> Option<ExactValue> {
        match field {
            TravellerField::Id => Some(ExactValue::Int(self.id)),
            TravellerField::Uuid => Some(ExactValue::Text(self.uuid.clone())),
            TravellerField::IsActive => self.is_active.map(ExactValue::Bool),
            TravellerField::UserIsActive => self.user.is_active.map(ExactValue::Bool),
        }
    }
}
