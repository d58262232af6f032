//! The standard 75-province map and its 1901 starting position.
//!
//! Province metadata and borders are listed once per unordered pair and
//! expanded through `MapBuilder`, which stores both directions.

use super::map::{MapBuilder, MapError, MapTopology, Passage};
use super::order::Location;
use super::province::{Coast, Power, ProvinceInfo, Terrain};
use super::state::{Position, StateError};
use super::unit::UnitType;

/// The number of provinces on the standard map.
pub const PROVINCE_COUNT: usize = 75;

/// The number of supply centers on the standard map.
pub const SUPPLY_CENTER_COUNT: usize = 34;

pub const AUSTRIA: Power = Power(0);
pub const ENGLAND: Power = Power(1);
pub const FRANCE: Power = Power(2);
pub const GERMANY: Power = Power(3);
pub const ITALY: Power = Power(4);
pub const RUSSIA: Power = Power(5);
pub const TURKEY: Power = Power(6);

const POWERS: [(&str, &str); 7] = [
    ("austria", "Austria"),
    ("england", "England"),
    ("france", "France"),
    ("germany", "Germany"),
    ("italy", "Italy"),
    ("russia", "Russia"),
    ("turkey", "Turkey"),
];

#[derive(Clone, Copy)]
enum Center {
    No,
    Neutral,
    Home(Power),
}

use Center::{Home, Neutral, No};
use Passage::{Army as A, Both as B, Fleet as F};
use Terrain::{Coastal as C, Land as L, Sea as S};

const AUS: Power = AUSTRIA;
const ENG: Power = ENGLAND;
const FRA: Power = FRANCE;
const GER: Power = GERMANY;
const ITA: Power = ITALY;
const RUS: Power = RUSSIA;
const TUR: Power = TURKEY;

static PROVINCES: [(&str, &str, Terrain, Center); PROVINCE_COUNT] = [
    ("adr", "Adriatic Sea", S, No),
    ("aeg", "Aegean Sea", S, No),
    ("alb", "Albania", C, No),
    ("ank", "Ankara", C, Home(TUR)),
    ("apu", "Apulia", C, No),
    ("arm", "Armenia", C, No),
    ("bal", "Baltic Sea", S, No),
    ("bar", "Barents Sea", S, No),
    ("bel", "Belgium", C, Neutral),
    ("ber", "Berlin", C, Home(GER)),
    ("bla", "Black Sea", S, No),
    ("boh", "Bohemia", L, No),
    ("bot", "Gulf of Bothnia", S, No),
    ("bre", "Brest", C, Home(FRA)),
    ("bud", "Budapest", L, Home(AUS)),
    ("bul", "Bulgaria", C, Neutral),
    ("bur", "Burgundy", L, No),
    ("cly", "Clyde", C, No),
    ("con", "Constantinople", C, Home(TUR)),
    ("den", "Denmark", C, Neutral),
    ("eas", "Eastern Mediterranean", S, No),
    ("edi", "Edinburgh", C, Home(ENG)),
    ("eng", "English Channel", S, No),
    ("fin", "Finland", C, No),
    ("gal", "Galicia", L, No),
    ("gas", "Gascony", C, No),
    ("gol", "Gulf of Lyon", S, No),
    ("gre", "Greece", C, Neutral),
    ("hel", "Heligoland Bight", S, No),
    ("hol", "Holland", C, Neutral),
    ("ion", "Ionian Sea", S, No),
    ("iri", "Irish Sea", S, No),
    ("kie", "Kiel", C, Home(GER)),
    ("lon", "London", C, Home(ENG)),
    ("lvn", "Livonia", C, No),
    ("lvp", "Liverpool", C, Home(ENG)),
    ("mao", "Mid-Atlantic Ocean", S, No),
    ("mar", "Marseilles", C, Home(FRA)),
    ("mos", "Moscow", L, Home(RUS)),
    ("mun", "Munich", L, Home(GER)),
    ("naf", "North Africa", C, No),
    ("nao", "North Atlantic Ocean", S, No),
    ("nap", "Naples", C, Home(ITA)),
    ("nrg", "Norwegian Sea", S, No),
    ("nth", "North Sea", S, No),
    ("nwy", "Norway", C, Neutral),
    ("par", "Paris", L, Home(FRA)),
    ("pic", "Picardy", C, No),
    ("pie", "Piedmont", C, No),
    ("por", "Portugal", C, Neutral),
    ("pru", "Prussia", C, No),
    ("rom", "Rome", C, Home(ITA)),
    ("ruh", "Ruhr", L, No),
    ("rum", "Rumania", C, Neutral),
    ("ser", "Serbia", L, Neutral),
    ("sev", "Sevastopol", C, Home(RUS)),
    ("sil", "Silesia", L, No),
    ("ska", "Skagerrak", S, No),
    ("smy", "Smyrna", C, Home(TUR)),
    ("spa", "Spain", C, Neutral),
    ("stp", "St. Petersburg", C, Home(RUS)),
    ("swe", "Sweden", C, Neutral),
    ("syr", "Syria", C, No),
    ("tri", "Trieste", C, Home(AUS)),
    ("tun", "Tunisia", C, Neutral),
    ("tus", "Tuscany", C, No),
    ("tyr", "Tyrolia", L, No),
    ("tys", "Tyrrhenian Sea", S, No),
    ("ukr", "Ukraine", L, No),
    ("ven", "Venice", C, Home(ITA)),
    ("vie", "Vienna", L, Home(AUS)),
    ("wal", "Wales", C, No),
    ("war", "Warsaw", L, Home(RUS)),
    ("wes", "Western Mediterranean", S, No),
    ("yor", "Yorkshire", C, No),];

static SPLIT_COASTS: [(&str, [Coast; 2]); 3] = [
    ("bul", [Coast::East, Coast::South]),
    ("spa", [Coast::North, Coast::South]),
    ("stp", [Coast::North, Coast::South]),
];

static BORDERS: &[(&str, &str, Passage)] = &[
    ("adr", "alb", F), ("adr", "apu", F), ("adr", "ion", F), ("adr", "tri", F),
    ("adr", "ven", F),
    ("aeg", "bul/sc", F), ("aeg", "con", F), ("aeg", "eas", F), ("aeg", "gre", F),
    ("aeg", "ion", F), ("aeg", "smy", F),
    ("alb", "gre", B), ("alb", "ion", F), ("alb", "ser", A), ("alb", "tri", B),
    ("ank", "arm", B), ("ank", "bla", F), ("ank", "con", B), ("ank", "smy", A),
    ("apu", "ion", F), ("apu", "nap", B), ("apu", "rom", A), ("apu", "ven", B),
    ("arm", "bla", F), ("arm", "sev", B), ("arm", "smy", A), ("arm", "syr", A),
    ("bal", "ber", F), ("bal", "bot", F), ("bal", "den", F), ("bal", "kie", F),
    ("bal", "lvn", F), ("bal", "pru", F), ("bal", "swe", F),
    ("bar", "nrg", F), ("bar", "nwy", F), ("bar", "stp/nc", F),
    ("bel", "bur", A), ("bel", "eng", F), ("bel", "hol", B), ("bel", "nth", F),
    ("bel", "pic", B), ("bel", "ruh", A),
    ("ber", "kie", B), ("ber", "mun", A), ("ber", "pru", B), ("ber", "sil", A),
    ("bla", "bul/ec", F), ("bla", "con", F), ("bla", "rum", F), ("bla", "sev", F),
    ("boh", "gal", A), ("boh", "mun", A), ("boh", "sil", A), ("boh", "tyr", A),
    ("boh", "vie", A),
    ("bot", "fin", F), ("bot", "lvn", F), ("bot", "stp/sc", F), ("bot", "swe", F),
    ("bre", "eng", F), ("bre", "gas", B), ("bre", "mao", F), ("bre", "par", A),
    ("bre", "pic", B),
    ("bud", "gal", A), ("bud", "rum", A), ("bud", "ser", A), ("bud", "tri", A),
    ("bud", "vie", A),
    ("bul", "con", A), ("bul", "gre", A), ("bul", "rum", A), ("bul", "ser", A),
    ("bul/ec", "con", F), ("bul/ec", "rum", F), ("bul/sc", "con", F), ("bul/sc", "gre", F),
    ("bur", "gas", A), ("bur", "mar", A), ("bur", "mun", A), ("bur", "par", A),
    ("bur", "pic", A), ("bur", "ruh", A),
    ("cly", "edi", B), ("cly", "lvp", B), ("cly", "nao", F), ("cly", "nrg", F),
    ("con", "smy", B),
    ("den", "hel", F), ("den", "kie", B), ("den", "nth", F), ("den", "ska", F),
    ("den", "swe", B),
    ("eas", "ion", F), ("eas", "smy", F), ("eas", "syr", F),
    ("edi", "lvp", A), ("edi", "nrg", F), ("edi", "nth", F), ("edi", "yor", B),
    ("eng", "iri", F), ("eng", "lon", F), ("eng", "mao", F), ("eng", "nth", F),
    ("eng", "pic", F), ("eng", "wal", F),
    ("fin", "nwy", A), ("fin", "stp", A), ("fin", "stp/sc", F), ("fin", "swe", B),
    ("gal", "rum", A), ("gal", "sil", A), ("gal", "ukr", A), ("gal", "vie", A),
    ("gal", "war", A),
    ("gas", "mao", F), ("gas", "mar", A), ("gas", "par", A), ("gas", "spa", A),
    ("gas", "spa/nc", F),
    ("gol", "mar", F), ("gol", "pie", F), ("gol", "spa/sc", F), ("gol", "tus", F),
    ("gol", "tys", F), ("gol", "wes", F),
    ("gre", "ion", F), ("gre", "ser", A),
    ("hel", "hol", F), ("hel", "kie", F), ("hel", "nth", F),
    ("hol", "kie", B), ("hol", "nth", F), ("hol", "ruh", A),
    ("ion", "nap", F), ("ion", "tun", F), ("ion", "tys", F),
    ("iri", "lvp", F), ("iri", "mao", F), ("iri", "nao", F), ("iri", "wal", F),
    ("kie", "mun", A), ("kie", "ruh", A),
    ("lon", "nth", F), ("lon", "wal", B), ("lon", "yor", B),
    ("lvn", "mos", A), ("lvn", "pru", B), ("lvn", "stp", A), ("lvn", "stp/sc", F),
    ("lvn", "war", A),
    ("lvp", "nao", F), ("lvp", "wal", B), ("lvp", "yor", A),
    ("mao", "naf", F), ("mao", "nao", F), ("mao", "por", F), ("mao", "spa/nc", F),
    ("mao", "spa/sc", F), ("mao", "wes", F),
    ("mar", "pie", B), ("mar", "spa", A), ("mar", "spa/sc", F),
    ("mos", "sev", A), ("mos", "stp", A), ("mos", "ukr", A), ("mos", "war", A),
    ("mun", "ruh", A), ("mun", "sil", A), ("mun", "tyr", A),
    ("naf", "tun", B), ("naf", "wes", F),
    ("nao", "nrg", F),
    ("nap", "rom", B), ("nap", "tys", F),
    ("nrg", "nth", F), ("nrg", "nwy", F),
    ("nth", "nwy", F), ("nth", "ska", F), ("nth", "yor", F),
    ("nwy", "ska", F), ("nwy", "stp", A), ("nwy", "stp/nc", F), ("nwy", "swe", B),
    ("par", "pic", A),
    ("pie", "tus", B), ("pie", "tyr", A), ("pie", "ven", A),
    ("por", "spa", A), ("por", "spa/nc", F), ("por", "spa/sc", F),
    ("pru", "sil", A), ("pru", "war", A),
    ("rom", "tus", B), ("rom", "tys", F), ("rom", "ven", A),
    ("rum", "ser", A), ("rum", "sev", B), ("rum", "ukr", A),
    ("ser", "tri", A),
    ("sev", "ukr", A),
    ("sil", "war", A),
    ("ska", "swe", F),
    ("smy", "syr", B),
    ("spa/sc", "wes", F),
    ("tri", "tyr", A), ("tri", "ven", B), ("tri", "vie", A),
    ("tun", "tys", F), ("tun", "wes", F),
    ("tus", "tys", F), ("tus", "ven", A),
    ("tyr", "ven", A), ("tyr", "vie", A),
    ("tys", "wes", F),
    ("ukr", "war", A),
    ("wal", "yor", A),];

/// Starting units: (power, unit type, location).
static OPENING_UNITS: [(Power, UnitType, &str); 22] = [
    (AUS, UnitType::Army, "vie"),
    (AUS, UnitType::Army, "bud"),
    (AUS, UnitType::Fleet, "tri"),
    (ENG, UnitType::Fleet, "lon"),
    (ENG, UnitType::Fleet, "edi"),
    (ENG, UnitType::Army, "lvp"),
    (FRA, UnitType::Fleet, "bre"),
    (FRA, UnitType::Army, "par"),
    (FRA, UnitType::Army, "mar"),
    (GER, UnitType::Fleet, "kie"),
    (GER, UnitType::Army, "ber"),
    (GER, UnitType::Army, "mun"),
    (ITA, UnitType::Fleet, "nap"),
    (ITA, UnitType::Army, "rom"),
    (ITA, UnitType::Army, "ven"),
    (RUS, UnitType::Fleet, "stp/sc"),
    (RUS, UnitType::Army, "mos"),
    (RUS, UnitType::Army, "war"),
    (RUS, UnitType::Fleet, "sev"),
    (TUR, UnitType::Fleet, "ank"),
    (TUR, UnitType::Army, "con"),
    (TUR, UnitType::Army, "smy"),
];

fn build_standard() -> Result<MapTopology, MapError> {
    let mut b = MapBuilder::new();
    for (name, display) in POWERS {
        b.add_power(name, display);
    }
    for &(abbr, name, terrain, center) in PROVINCES.iter() {
        let mut info = ProvinceInfo::new(abbr, name, terrain);
        match center {
            No => {}
            Neutral => info = info.supply_center(None),
            Home(power) => info = info.supply_center(Some(power)),
        }
        if let Some((_, coasts)) = SPLIT_COASTS.iter().find(|(a, _)| *a == abbr) {
            info = info.with_coasts(coasts);
        }
        b.add_province(info)?;
    }
    for &(from, to, passage) in BORDERS {
        b.add_border(from, to, passage)?;
    }
    b.build()
}

/// Builds the standard map.
pub fn standard_map() -> MapTopology {
    // The tables above are fixed and covered by tests; a failure here is a
    // transcription bug, not a runtime condition.
    build_standard().expect("standard map tables are consistent")
}

/// Returns the Spring 1901 position: 22 units, home centers owned.
pub fn opening_position(map: &MapTopology) -> Result<Position, StateError> {
    let mut position = Position::new(map);
    for power in map.powers() {
        for center in map.home_centers(power) {
            position.set_sc_owner(center, Some(power));
        }
    }
    for &(power, unit_type, spec) in OPENING_UNITS.iter() {
        let (abbr, coast) = spec.split_once('/').unwrap_or((spec, ""));
        let province = map
            .province(abbr)
            .ok_or_else(|| StateError::UnknownProvince(abbr.to_string()))?;
        let coast = Coast::from_abbr(coast).unwrap_or(Coast::None);
        position.place_unit(map, Location::with_coast(province, coast), power, unit_type)?;
    }
    Ok(position)
}
