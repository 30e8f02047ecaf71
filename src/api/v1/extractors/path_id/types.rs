/**
 * Responsibility
 *  - one tag type + alias per resource id that appears in a path
 */
use super::core::{PathId, PathParam};

// travellers
pub enum TravellerTag {}
impl PathParam for TravellerTag {
    const NAME: &'static str = "traveller_id";
    const RESOURCE: &'static str = "Traveller";
}
pub type TravellerId = PathId<TravellerTag>;

// countries
pub enum CountryTag {}
impl PathParam for CountryTag {
    const NAME: &'static str = "country_id";
    const RESOURCE: &'static str = "Country";
}
pub type CountryId = PathId<CountryTag>;
