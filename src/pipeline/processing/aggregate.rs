//! Filtering and summary counts over normalized map objects.
//!
//! Filters never reorder: `visible` keeps the input order. Sorting is a
//! separate step (`sort_objects`) for views that ask for it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::constants::{FILTER_ALL, UNKNOWN_REGION};
use crate::domain::{ConditionBand, MapObject, ObjectKind, PriorityLevel, TechnicalCondition};

/// An empty value is treated as an omitted filter.
fn is_all(value: &str) -> bool {
    value.is_empty() || value == FILTER_ALL
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegionFilter {
    #[default]
    All,
    /// Exact, case-sensitive match. Objects without a region never match.
    Exact(String),
}

impl RegionFilter {
    pub fn parse(value: &str) -> Self {
        if is_all(value) {
            RegionFilter::All
        } else {
            RegionFilter::Exact(value.to_string())
        }
    }

    fn matches(&self, region: Option<&str>) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Exact(wanted) => region == Some(wanted.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConditionFilter {
    #[default]
    All,
    Exact(TechnicalCondition),
}

impl ConditionFilter {
    fn matches(&self, condition: TechnicalCondition) -> bool {
        match self {
            ConditionFilter::All => true,
            ConditionFilter::Exact(wanted) => *wanted == condition,
        }
    }
}

impl FromStr for ConditionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_all(s) {
            return Ok(ConditionFilter::All);
        }
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(TechnicalCondition::new)
            .map(ConditionFilter::Exact)
            .ok_or_else(|| format!("condition filter must be 'all' or 1-5, got '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Level(PriorityLevel),
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_all(s) {
            return Ok(PriorityFilter::All);
        }
        s.parse::<PriorityLevel>().map(PriorityFilter::Level)
    }
}

/// Criteria for the visible subset; every predicate must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Case-insensitive substring of the name, taken verbatim; empty matches everything
    pub search_text: Option<String>,
    pub region: RegionFilter,
    pub condition: ConditionFilter,
    /// Enabled map layers; `None` shows every layer
    pub kinds: Option<Vec<ObjectKind>>,
    pub priority: PriorityFilter,
}

impl FilterSpec {
    /// Shows only the given map layers, with every other predicate open.
    pub fn kinds_only(kinds: &[ObjectKind]) -> Self {
        FilterSpec {
            kinds: Some(kinds.to_vec()),
            ..Default::default()
        }
    }

    pub fn matches(&self, object: &MapObject) -> bool {
        self.matches_search(&object.name)
            && self.region.matches(object.region.as_deref())
            && self.condition.matches(object.technical_condition)
            && self.matches_kind(object.kind())
            && self.matches_priority(object)
    }

    fn matches_search(&self, name: &str) -> bool {
        match self.search_text.as_deref() {
            None | Some("") => true,
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
        }
    }

    fn matches_kind(&self, kind: ObjectKind) -> bool {
        self.kinds
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&kind))
    }

    fn matches_priority(&self, object: &MapObject) -> bool {
        match self.priority {
            PriorityFilter::All => true,
            PriorityFilter::Level(level) => object.effective_priority().level == level,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionBandCounts {
    pub good: usize,
    pub medium: usize,
    pub bad: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindCounts {
    pub water_bodies: usize,
    pub facilities: usize,
    pub critical_zones: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub total: usize,
    pub by_condition_band: ConditionBandCounts,
    pub high_priority_count: usize,
    pub by_kind: KindCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub visible: Vec<MapObject>,
    pub counts: Counts,
}

/// Summary counts over `objects`
pub fn summarize(objects: &[MapObject]) -> Counts {
    objects.iter().fold(Counts::default(), |mut counts, object| {
        counts.total += 1;
        match object.band() {
            ConditionBand::Good => counts.by_condition_band.good += 1,
            ConditionBand::Medium => counts.by_condition_band.medium += 1,
            ConditionBand::Bad => counts.by_condition_band.bad += 1,
        }
        match object.kind() {
            ObjectKind::WaterBody => counts.by_kind.water_bodies += 1,
            ObjectKind::Facility => counts.by_kind.facilities += 1,
            ObjectKind::CriticalZone => counts.by_kind.critical_zones += 1,
        }
        if object.effective_priority().level == PriorityLevel::High {
            counts.high_priority_count += 1;
        }
        counts
    })
}

/// Visible subset in input order, with counts over that subset.
pub fn aggregate(objects: &[MapObject], filter: &FilterSpec) -> Aggregate {
    let visible: Vec<MapObject> = objects
        .iter()
        .filter(|object| filter.matches(object))
        .cloned()
        .collect();
    let counts = summarize(&visible);

    Aggregate { visible, counts }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    PriorityDesc,
    PriorityAsc,
    NameAsc,
    NameDesc,
    ConditionDesc,
    ConditionAsc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "priority_desc" => Ok(SortOrder::PriorityDesc),
            "priority_asc" => Ok(SortOrder::PriorityAsc),
            "name_asc" => Ok(SortOrder::NameAsc),
            "name_desc" => Ok(SortOrder::NameDesc),
            "condition_desc" => Ok(SortOrder::ConditionDesc),
            "condition_asc" => Ok(SortOrder::ConditionAsc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

fn compare_names(a: &MapObject, b: &MapObject) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Stable sort; equal keys keep their relative order.
pub fn sort_objects(objects: &mut [MapObject], order: SortOrder) {
    match order {
        SortOrder::PriorityDesc => objects.sort_by(|a, b| {
            b.effective_priority().score.cmp(&a.effective_priority().score)
        }),
        SortOrder::PriorityAsc => objects.sort_by(|a, b| {
            a.effective_priority().score.cmp(&b.effective_priority().score)
        }),
        SortOrder::NameAsc => objects.sort_by(compare_names),
        SortOrder::NameDesc => objects.sort_by(|a, b| compare_names(b, a)),
        SortOrder::ConditionDesc => {
            objects.sort_by(|a, b| b.technical_condition.cmp(&a.technical_condition))
        }
        SortOrder::ConditionAsc => {
            objects.sort_by(|a, b| a.technical_condition.cmp(&b.technical_condition))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

pub fn priority_distribution(objects: &[MapObject]) -> PriorityDistribution {
    objects
        .iter()
        .fold(PriorityDistribution::default(), |mut dist, object| {
            match object.effective_priority().level {
                PriorityLevel::High => dist.high += 1,
                PriorityLevel::Medium => dist.medium += 1,
                PriorityLevel::Low => dist.low += 1,
            }
            dist.total += 1;
            dist
        })
}

/// Object count per condition category; every category is present.
pub fn condition_distribution(objects: &[MapObject]) -> BTreeMap<TechnicalCondition, usize> {
    let mut distribution: BTreeMap<TechnicalCondition, usize> =
        TechnicalCondition::all().map(|c| (c, 0)).collect();
    for object in objects {
        *distribution.entry(object.technical_condition).or_default() += 1;
    }
    distribution
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionShare {
    pub region: String,
    pub count: usize,
    /// Share of all objects, rounded to a whole percent
    pub percentage: u32,
}

/// Objects per region, largest first. Ties keep first-seen order.
pub fn regional_distribution(objects: &[MapObject]) -> Vec<RegionShare> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for object in objects {
        let region = object.region.as_deref().unwrap_or(UNKNOWN_REGION);
        match positions.get(region) {
            Some(&position) => order[position].1 += 1,
            None => {
                positions.insert(region.to_string(), order.len());
                order.push((region.to_string(), 1));
            }
        }
    }

    let total = objects.len();
    let mut shares: Vec<RegionShare> = order
        .into_iter()
        .map(|(region, count)| RegionShare {
            region,
            count,
            percentage: if total > 0 {
                ((count as f64 / total as f64) * 100.0).round() as u32
            } else {
                0
            },
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, ObjectDetails, ZoneLevel};

    fn create_test_object(id: &str, name: &str, region: Option<&str>, condition: u8) -> MapObject {
        MapObject {
            id: id.to_string(),
            name: name.to_string(),
            region: region.map(str::to_string),
            coordinates: Coordinates { lat: 45.0, lng: 75.0 },
            technical_condition: TechnicalCondition::new(condition).unwrap(),
            passport_year: None,
            passport_date: None,
            passport_age: 0,
            priority: None,
            details: ObjectDetails::Facility { facility_type: None },
        }
    }

    fn ids(objects: &[MapObject]) -> Vec<&str> {
        objects.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_on_name() {
        let objects = vec![
            create_test_object("1", "Алматинская ГЭС", None, 2),
            create_test_object("2", "Бухтарминская ГЭС", None, 2),
        ];
        let filter = FilterSpec {
            search_text: Some("алма".to_string()),
            ..Default::default()
        };

        let result = aggregate(&objects, &filter);
        assert_eq!(ids(&result.visible), vec!["1"]);
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let objects = vec![create_test_object("1", "Шлюз", None, 2)];
        let filter = FilterSpec {
            search_text: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(aggregate(&objects, &filter).visible.len(), 1);
    }

    #[test]
    fn test_search_whitespace_is_part_of_the_needle() {
        let objects = vec![
            create_test_object("1", "ГЭС Шульбинская", None, 2),
            create_test_object("2", "Бухтарминская ГЭС", None, 2),
            create_test_object("3", "Шлюз", None, 2),
        ];
        let search = |text: &str| FilterSpec {
            search_text: Some(text.to_string()),
            ..Default::default()
        };

        assert_eq!(ids(&aggregate(&objects, &search(" ГЭС")).visible), vec!["2"]);
        assert_eq!(ids(&aggregate(&objects, &search(" ")).visible), vec!["1", "2"]);
    }

    #[test]
    fn test_condition_filter_preserves_order() {
        let objects = vec![
            create_test_object("a", "A", Some("Астана"), 3),
            create_test_object("b", "B", Some("Астана"), 4),
            create_test_object("c", "C", None, 3),
            create_test_object("d", "D", Some("Шымкент"), 1),
            create_test_object("e", "E", Some("Шымкент"), 3),
        ];
        let filter = FilterSpec {
            region: RegionFilter::parse("all"),
            condition: "3".parse().unwrap(),
            ..Default::default()
        };

        let result = aggregate(&objects, &filter);
        assert_eq!(ids(&result.visible), vec!["a", "c", "e"]);
        assert!(result
            .visible
            .iter()
            .all(|o| o.technical_condition.value() == 3));
    }

    #[test]
    fn test_region_filter_is_exact_and_skips_missing_regions() {
        let objects = vec![
            create_test_object("1", "A", Some("Алматинская область"), 2),
            create_test_object("2", "B", Some("Алматы"), 2),
            create_test_object("3", "C", None, 2),
        ];
        let filter = FilterSpec {
            region: RegionFilter::parse("Алматы"),
            ..Default::default()
        };
        assert_eq!(ids(&aggregate(&objects, &filter).visible), vec!["2"]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let objects = vec![
            create_test_object("1", "Капшагайская ГЭС", Some("Алматинская область"), 3),
            create_test_object("2", "Капшагайская ГЭС", Some("Алматинская область"), 4),
            create_test_object("3", "Шардаринская ГЭС", Some("Алматинская область"), 3),
        ];
        let filter = FilterSpec {
            search_text: Some("КАПШАГАЙ".to_string()),
            region: RegionFilter::parse("Алматинская область"),
            condition: ConditionFilter::Exact(TechnicalCondition::DEFAULT),
            ..Default::default()
        };
        assert_eq!(ids(&aggregate(&objects, &filter).visible), vec!["1"]);
    }

    #[test]
    fn test_counts_by_band() {
        let objects: Vec<MapObject> = [1, 2, 3, 4, 5, 5]
            .iter()
            .enumerate()
            .map(|(i, c)| create_test_object(&i.to_string(), "obj", None, *c))
            .collect();

        let counts = aggregate(&objects, &FilterSpec::default()).counts;
        assert_eq!(counts.total, 6);
        assert_eq!(
            counts.by_condition_band,
            ConditionBandCounts { good: 2, medium: 1, bad: 3 }
        );
        assert_eq!(counts.by_kind.facilities, 6);
        // Ages are 0, so conditions 1 (15) and 2 (12) reach high
        assert_eq!(counts.high_priority_count, 2);
    }

    #[test]
    fn test_kind_and_priority_filters() {
        let mut zone = create_test_object("z", "Иртыш", None, 5);
        zone.details = ObjectDetails::CriticalZone {
            level: Some(ZoneLevel::Critical),
            description: None,
        };
        let objects = vec![
            create_test_object("f1", "ГЭС", None, 1),
            zone,
            create_test_object("f2", "Плотина", None, 4),
        ];

        let layers = FilterSpec {
            kinds: Some(vec![ObjectKind::CriticalZone]),
            ..Default::default()
        };
        assert_eq!(ids(&aggregate(&objects, &layers).visible), vec!["z"]);

        let high = FilterSpec {
            priority: "high".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(ids(&aggregate(&objects, &high).visible), vec!["f1"]);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<ConditionFilter>().unwrap(), ConditionFilter::All);
        assert_eq!("".parse::<ConditionFilter>().unwrap(), ConditionFilter::All);
        assert!("6".parse::<ConditionFilter>().is_err());
        assert!("bad".parse::<ConditionFilter>().is_err());
        assert_eq!(RegionFilter::parse("all"), RegionFilter::All);
        assert_eq!(RegionFilter::parse(""), RegionFilter::All);
        assert_eq!(RegionFilter::parse("ALL"), RegionFilter::Exact("ALL".to_string()));
        assert_eq!(
            RegionFilter::parse(" Алматы"),
            RegionFilter::Exact(" Алматы".to_string())
        );
        assert!("ALL".parse::<ConditionFilter>().is_err());
        assert_eq!("all".parse::<PriorityFilter>().unwrap(), PriorityFilter::All);
        assert!("All".parse::<PriorityFilter>().is_err());
        assert!("urgent".parse::<PriorityFilter>().is_err());
    }

    #[test]
    fn test_sort_orders_are_stable() {
        let mut objects = vec![
            create_test_object("1", "бета", None, 3),
            create_test_object("2", "Альфа", None, 5),
            create_test_object("3", "гамма", None, 3),
            create_test_object("4", "Дельта", None, 1),
        ];

        sort_objects(&mut objects, SortOrder::PriorityDesc);
        assert_eq!(ids(&objects), vec!["4", "1", "3", "2"]);

        sort_objects(&mut objects, SortOrder::NameAsc);
        assert_eq!(ids(&objects), vec!["2", "1", "3", "4"]);

        sort_objects(&mut objects, SortOrder::ConditionDesc);
        assert_eq!(ids(&objects), vec!["2", "1", "3", "4"]);

        sort_objects(&mut objects, SortOrder::ConditionAsc);
        assert_eq!(ids(&objects), vec!["4", "1", "3", "2"]);
    }

    #[test]
    fn test_distributions() {
        let objects = vec![
            create_test_object("1", "A", Some("Астана"), 1),
            create_test_object("2", "B", Some("Шымкент"), 3),
            create_test_object("3", "C", Some("Шымкент"), 5),
            create_test_object("4", "D", None, 5),
        ];

        // Scores at age 0: 15, 9, 3, 3
        let priorities = priority_distribution(&objects);
        assert_eq!(
            priorities,
            PriorityDistribution { high: 1, medium: 1, low: 2, total: 4 }
        );

        let conditions = condition_distribution(&objects);
        let counts: Vec<usize> = conditions.values().copied().collect();
        assert_eq!(counts, vec![1, 0, 1, 0, 2]);

        let regions = regional_distribution(&objects);
        assert_eq!(regions[0].region, "Шымкент");
        assert_eq!(regions[0].count, 2);
        assert_eq!(regions[0].percentage, 50);
        assert_eq!(regions[1].region, "Астана");
        assert_eq!(regions[2].region, UNKNOWN_REGION);
        assert_eq!(regions[2].percentage, 25);
    }

    #[test]
    fn test_empty_input() {
        let result = aggregate(&[], &FilterSpec::default());
        assert!(result.visible.is_empty());
        assert_eq!(result.counts, Counts::default());
        assert!(regional_distribution(&[]).is_empty());
    }
}
