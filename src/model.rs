// 📋 Monthly Record Model - Households, Commercial Units, Main Meter
// One MonthlyRecord per calendar month. Rows are generated once at creation
// and never added or removed; only values and inspector attribution change.

use serde::{Deserialize, Serialize};

// ============================================================================
// BUILDING LAYOUT
// ============================================================================

pub const FLOOR_SUFFIX: &str = "층";
pub const UNIT_SUFFIX: &str = "호";

/// Residential floors run 2..=17 (16 floors)
pub const FIRST_FLOOR: u32 = 2;
pub const LAST_FLOOR: u32 = 17;

/// Units run 1..=19 on every residential floor
pub const UNITS_PER_FLOOR: u32 = 19;

pub const HOUSEHOLD_COUNT: usize = ((LAST_FLOOR - FIRST_FLOOR + 1) * UNITS_PER_FLOOR) as usize;

/// Ground-floor shops, in display/export order
pub const COMMERCIAL_UNITS: [&str; 19] = [
    "101호", "102호", "103호", "104호", "105호", "106호", "107호", "108호",
    "109호", "110호", "111-1호", "111-2호", "112호", "113호", "114호",
    "115호", "116호", "117호", "118호",
];

pub fn floor_label(floor: u32) -> String {
    format!("{}{}", floor, FLOOR_SUFFIX)
}

pub fn unit_label(unit: u32) -> String {
    format!("{}{}", unit, UNIT_SUFFIX)
}

/// All floor labels, ascending ("2층" .. "17층")
pub fn floor_labels() -> Vec<String> {
    (FIRST_FLOOR..=LAST_FLOOR).map(floor_label).collect()
}

/// All unit labels of one floor, ascending ("1호" .. "19호")
pub fn unit_labels() -> Vec<String> {
    (1..=UNITS_PER_FLOOR).map(unit_label).collect()
}

/// (floor, unit) pairs in generation order: floor-major, unit-minor.
pub fn household_layout() -> impl Iterator<Item = (u32, u32)> {
    (FIRST_FLOOR..=LAST_FLOOR).flat_map(|floor| (1..=UNITS_PER_FLOOR).map(move |unit| (floor, unit)))
}

/// Leading integer of a label, the way "17층" or "3호" is read back.
pub fn leading_integer(label: &str) -> Option<u32> {
    let digits: String = label
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Unit after (floor, unit) in generation order; rolls to the next floor.
pub fn next_unit(floor: &str, unit: &str) -> Option<(String, String)> {
    let f = leading_integer(floor)?;
    let u = leading_integer(unit)?;

    if u < UNITS_PER_FLOOR {
        Some((floor_label(f), unit_label(u + 1)))
    } else if f < LAST_FLOOR {
        Some((floor_label(f + 1), unit_label(1)))
    } else {
        None
    }
}

/// Unit before (floor, unit) in generation order; rolls to the previous floor.
pub fn previous_unit(floor: &str, unit: &str) -> Option<(String, String)> {
    let f = leading_integer(floor)?;
    let u = leading_integer(unit)?;

    if u > 1 {
        Some((floor_label(f), unit_label(u - 1)))
    } else if f > FIRST_FLOOR {
        Some((floor_label(f - 1), unit_label(UNITS_PER_FLOOR)))
    } else {
        None
    }
}

// ============================================================================
// READINGS
// ============================================================================

/// A recorded meter value; `None` is "not yet recorded", distinct from zero.
pub type Reading = Option<f64>;

/// Parse form input permissively: blank is unset, otherwise the leading
/// number (sign, digits, fraction, exponent) is taken and anything after it
/// ignored. Results that overflow to infinity are unset.
pub fn parse_reading(raw: &str) -> Reading {
    let bytes = raw.trim().as_bytes();
    let mut pos = 0;
    let mut number = String::new();

    let take_digits = |pos: &mut usize, out: &mut String| {
        let start = *pos;
        while let Some(b) = bytes.get(*pos).filter(|b| b.is_ascii_digit()) {
            out.push(*b as char);
            *pos += 1;
        }
        *pos - start
    };

    if let Some(&sign @ (b'+' | b'-')) = bytes.first() {
        number.push(sign as char);
        pos += 1;
    }

    let mut digits = take_digits(&mut pos, &mut number);
    if bytes.get(pos) == Some(&b'.') {
        let mut fraction = String::new();
        let after_dot = pos + 1;
        let mut frac_pos = after_dot;
        let frac_digits = take_digits(&mut frac_pos, &mut fraction);
        if digits > 0 || frac_digits > 0 {
            pos = frac_pos;
        }
        if frac_digits > 0 {
            if digits == 0 {
                number.push('0');
            }
            number.push('.');
            number.push_str(&fraction);
        }
        digits += frac_digits;
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if let Some(b'e' | b'E') = bytes.get(pos) {
        let mut exp_pos = pos + 1;
        let mut exponent = String::from("e");
        if let Some(&sign @ (b'+' | b'-')) = bytes.get(exp_pos) {
            exponent.push(sign as char);
            exp_pos += 1;
        }
        if take_digits(&mut exp_pos, &mut exponent) > 0 {
            number.push_str(&exponent);
        }
    }

    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Serde adapter for the stored JSON shape: a number when set, `""` when unset.
mod blank_number {
    use super::parse_reading;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(v)) => Some(v),
            Some(Raw::Text(s)) => parse_reading(&s),
            None => None,
        })
    }
}

/// Who last wrote a reading row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InspectorRole {
    #[default]
    #[serde(rename = "주임")]
    Chief,
    #[serde(rename = "과장")]
    Manager,
}

impl InspectorRole {
    pub const ALL: [InspectorRole; 2] = [InspectorRole::Chief, InspectorRole::Manager];

    pub fn label(&self) -> &'static str {
        match self {
            InspectorRole::Chief => "주임",
            InspectorRole::Manager => "과장",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            InspectorRole::Chief => InspectorRole::Manager,
            InspectorRole::Manager => InspectorRole::Chief,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HouseholdField {
    OutdoorUnit,
    Heating,
    HotWater,
    Water,
    Elec13,
    Elec14,
    Elec15,
    Elec16,
    Elec17,
    Elec19,
    Elec20,
}

impl HouseholdField {
    /// Export column order
    pub const ALL: [HouseholdField; 11] = [
        HouseholdField::OutdoorUnit,
        HouseholdField::Heating,
        HouseholdField::HotWater,
        HouseholdField::Water,
        HouseholdField::Elec13,
        HouseholdField::Elec14,
        HouseholdField::Elec15,
        HouseholdField::Elec16,
        HouseholdField::Elec17,
        HouseholdField::Elec19,
        HouseholdField::Elec20,
    ];

    /// Fields that count toward unit completion, in form order
    pub const UTILITY: [HouseholdField; 4] = [
        HouseholdField::Water,
        HouseholdField::Heating,
        HouseholdField::HotWater,
        HouseholdField::OutdoorUnit,
    ];

    pub const ELECTRIC: [HouseholdField; 7] = [
        HouseholdField::Elec13,
        HouseholdField::Elec14,
        HouseholdField::Elec15,
        HouseholdField::Elec16,
        HouseholdField::Elec17,
        HouseholdField::Elec19,
        HouseholdField::Elec20,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HouseholdField::OutdoorUnit => "실외기",
            HouseholdField::Heating => "난방",
            HouseholdField::HotWater => "온수",
            HouseholdField::Water => "급수",
            HouseholdField::Elec13 => "전기13",
            HouseholdField::Elec14 => "전기14",
            HouseholdField::Elec15 => "전기15",
            HouseholdField::Elec16 => "전기16",
            HouseholdField::Elec17 => "전기17",
            HouseholdField::Elec19 => "전기19",
            HouseholdField::Elec20 => "전기20",
        }
    }

    pub fn is_electric(&self) -> bool {
        Self::ELECTRIC.contains(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommercialField {
    Water,
}

impl CommercialField {
    pub fn label(&self) -> &'static str {
        match self {
            CommercialField::Water => "수도계량검침",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdReading {
    pub floor: String,
    pub unit: String,
    #[serde(default)]
    pub inspector: InspectorRole,
    #[serde(default, with = "blank_number")]
    pub outdoor_unit: Reading,
    #[serde(default, with = "blank_number")]
    pub heating: Reading,
    #[serde(default, with = "blank_number")]
    pub hot_water: Reading,
    #[serde(default, with = "blank_number")]
    pub water: Reading,
    #[serde(default, with = "blank_number")]
    pub elec13: Reading,
    #[serde(default, with = "blank_number")]
    pub elec14: Reading,
    #[serde(default, with = "blank_number")]
    pub elec15: Reading,
    #[serde(default, with = "blank_number")]
    pub elec16: Reading,
    #[serde(default, with = "blank_number")]
    pub elec17: Reading,
    #[serde(default, with = "blank_number")]
    pub elec19: Reading,
    #[serde(default, with = "blank_number")]
    pub elec20: Reading,
}

impl HouseholdReading {
    pub fn blank(floor: String, unit: String) -> Self {
        Self {
            floor,
            unit,
            inspector: InspectorRole::default(),
            outdoor_unit: None,
            heating: None,
            hot_water: None,
            water: None,
            elec13: None,
            elec14: None,
            elec15: None,
            elec16: None,
            elec17: None,
            elec19: None,
            elec20: None,
        }
    }

    pub fn get(&self, field: HouseholdField) -> Reading {
        match field {
            HouseholdField::OutdoorUnit => self.outdoor_unit,
            HouseholdField::Heating => self.heating,
            HouseholdField::HotWater => self.hot_water,
            HouseholdField::Water => self.water,
            HouseholdField::Elec13 => self.elec13,
            HouseholdField::Elec14 => self.elec14,
            HouseholdField::Elec15 => self.elec15,
            HouseholdField::Elec16 => self.elec16,
            HouseholdField::Elec17 => self.elec17,
            HouseholdField::Elec19 => self.elec19,
            HouseholdField::Elec20 => self.elec20,
        }
    }

    pub fn set(&mut self, field: HouseholdField, value: Reading) {
        let slot = match field {
            HouseholdField::OutdoorUnit => &mut self.outdoor_unit,
            HouseholdField::Heating => &mut self.heating,
            HouseholdField::HotWater => &mut self.hot_water,
            HouseholdField::Water => &mut self.water,
            HouseholdField::Elec13 => &mut self.elec13,
            HouseholdField::Elec14 => &mut self.elec14,
            HouseholdField::Elec15 => &mut self.elec15,
            HouseholdField::Elec16 => &mut self.elec16,
            HouseholdField::Elec17 => &mut self.elec17,
            HouseholdField::Elec19 => &mut self.elec19,
            HouseholdField::Elec20 => &mut self.elec20,
        };
        *slot = value;
    }

    pub fn matches(&self, floor: &str, unit: &str) -> bool {
        self.floor == floor && self.unit == unit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialReading {
    pub unit: String,
    #[serde(default)]
    pub inspector: InspectorRole,
    #[serde(default, with = "blank_number")]
    pub water: Reading,
}

impl CommercialReading {
    pub fn blank(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            inspector: InspectorRole::default(),
            water: None,
        }
    }

    pub fn get(&self, field: CommercialField) -> Reading {
        match field {
            CommercialField::Water => self.water,
        }
    }

    pub fn set(&mut self, field: CommercialField, value: Reading) {
        match field {
            CommercialField::Water => self.water = value,
        }
    }
}

// ============================================================================
// MONTHLY RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    /// Canonical "YYYY-MM"; also the sort key
    pub id: String,
    /// Display name "YYYY년 M월"
    pub name: String,
    #[serde(default, with = "blank_number")]
    pub main_meter: Reading,
    pub households: Vec<HouseholdReading>,
    pub commercials: Vec<CommercialReading>,
}

impl MonthlyRecord {
    /// Fresh record for `id` with every household and commercial row present
    /// and unset. `id` must already be a validated "YYYY-MM".
    pub fn blank(id: &str) -> Self {
        let households = household_layout()
            .map(|(floor, unit)| HouseholdReading::blank(floor_label(floor), unit_label(unit)))
            .collect();

        let commercials = COMMERCIAL_UNITS
            .iter()
            .map(|unit| CommercialReading::blank(unit))
            .collect();

        Self {
            id: id.to_string(),
            name: month_name(id),
            main_meter: None,
            households,
            commercials,
        }
    }

    pub fn household(&self, floor: &str, unit: &str) -> Option<&HouseholdReading> {
        self.households.iter().find(|h| h.matches(floor, unit))
    }

    pub fn household_index(&self, floor: &str, unit: &str) -> Option<usize> {
        self.households.iter().position(|h| h.matches(floor, unit))
    }
}

/// "2025-03" -> "2025년 3월"
pub fn month_name(id: &str) -> String {
    match id.split_once('-') {
        Some((year, month)) => match month.parse::<u32>() {
            Ok(m) => format!("{}년 {}월", year, m),
            Err(_) => format!("{}년 {}월", year, month),
        },
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_blank_record_shape() {
        let record = MonthlyRecord::blank("2025-03");

        assert_eq!(record.name, "2025년 3월");
        assert_eq!(record.households.len(), HOUSEHOLD_COUNT);
        assert_eq!(record.households.len(), 304);
        assert_eq!(record.commercials.len(), COMMERCIAL_UNITS.len());
        assert!(record.main_meter.is_none());

        let first = &record.households[0];
        assert_eq!((first.floor.as_str(), first.unit.as_str()), ("2층", "1호"));
        let last = &record.households[303];
        assert_eq!((last.floor.as_str(), last.unit.as_str()), ("17층", "19호"));

        for h in &record.households {
            assert_eq!(h.inspector, InspectorRole::Chief);
            assert!(HouseholdField::ALL.iter().all(|f| h.get(*f).is_none()));
        }
        assert_eq!(record.commercials[10].unit, "111-1호");
    }

    #[test]
    fn test_household_pairs_unique() {
        let record = MonthlyRecord::blank("2025-03");
        let pairs: HashSet<_> = record
            .households
            .iter()
            .map(|h| (h.floor.clone(), h.unit.clone()))
            .collect();
        assert_eq!(pairs.len(), HOUSEHOLD_COUNT);
    }

    #[test]
    fn test_parse_reading_permissive() {
        assert_eq!(parse_reading(""), None);
        assert_eq!(parse_reading("   "), None);
        assert_eq!(parse_reading("12.5"), Some(12.5));
        assert_eq!(parse_reading("-3"), Some(-3.0));
        assert_eq!(parse_reading("42abc"), Some(42.0));
        assert_eq!(parse_reading("7."), Some(7.0));
        assert_eq!(parse_reading("abc"), None);
        assert_eq!(parse_reading("-"), None);
        assert_eq!(parse_reading("."), None);
        assert_eq!(parse_reading(".5"), Some(0.5));
        assert_eq!(parse_reading("12.5.3"), Some(12.5));
    }

    #[test]
    fn test_parse_reading_exponent_and_overflow() {
        assert_eq!(parse_reading("1e3"), Some(1000.0));
        assert_eq!(parse_reading("2.5E-1"), Some(0.25));
        assert_eq!(parse_reading("-4e+2m"), Some(-400.0));
        assert_eq!(parse_reading("1e"), Some(1.0));
        assert_eq!(parse_reading("1e+"), Some(1.0));
        assert_eq!(parse_reading("Infinity"), None);
        assert_eq!(parse_reading("1e400"), None);
        assert_eq!(parse_reading(&"9".repeat(400)), None);
    }

    #[test]
    fn test_json_shape_blank_is_empty_string() {
        let mut reading = HouseholdReading::blank("2층".into(), "1호".into());
        reading.water = Some(12.5);

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["water"], serde_json::json!(12.5));
        assert_eq!(json["hotWater"], serde_json::json!(""));
        assert_eq!(json["outdoorUnit"], serde_json::json!(""));
        assert_eq!(json["inspector"], serde_json::json!("주임"));
    }

    #[test]
    fn test_json_accepts_legacy_values() {
        let json = r#"{"unit":"101호","inspector":"과장","water":null}"#;
        let c: CommercialReading = serde_json::from_str(json).unwrap();
        assert_eq!(c.inspector, InspectorRole::Manager);
        assert_eq!(c.water, None);

        let json = r#"{"unit":"102호","inspector":"주임","water":"15.25"}"#;
        let c: CommercialReading = serde_json::from_str(json).unwrap();
        assert_eq!(c.water, Some(15.25));
    }

    #[test]
    fn test_unit_navigation() {
        assert_eq!(next_unit("2층", "1호"), Some(("2층".into(), "2호".into())));
        assert_eq!(next_unit("2층", "19호"), Some(("3층".into(), "1호".into())));
        assert_eq!(next_unit("17층", "19호"), None);

        assert_eq!(previous_unit("3층", "1호"), Some(("2층".into(), "19호".into())));
        assert_eq!(previous_unit("2층", "1호"), None);
    }

    #[test]
    fn test_month_name_drops_leading_zero() {
        assert_eq!(month_name("2026-01"), "2026년 1월");
        assert_eq!(month_name("2025-12"), "2025년 12월");
    }
}
