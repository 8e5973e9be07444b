use chrono::Weekday;
use log::debug;
use serde::Serialize;

use crate::allergens::ResolvedFilter;
use crate::dish::{Category, Dish};

/// Whether a dish is excluded by the resolved filter: a configured word
/// appears in its name (case-insensitive substring) or one of its allergen
/// codes is filtered. Pure predicate, no cross-dish state.
pub fn is_excluded(dish: &Dish, filter: &ResolvedFilter) -> bool {
    let name = dish.name.to_lowercase();
    if filter.words.iter().any(|word| name.contains(word.as_str())) {
        return true;
    }
    dish.allergen_codes.iter().any(|code| filter.codes.contains(code))
}

/// Keep the dishes that pass the filter, preserving discovery order.
pub fn filter_dishes(dishes: Vec<Dish>, filter: &ResolvedFilter) -> Vec<Dish> {
    dishes
        .into_iter()
        .filter(|dish| {
            let excluded = is_excluded(dish, filter);
            if excluded {
                debug!("filtered out '{}'", dish.name);
            }
            !excluded
        })
        .collect()
}

/// Dishes of one weekday, mains and sides kept apart, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayMenu {
    pub day: Weekday,
    pub mains: Vec<Dish>,
    pub sides: Vec<Dish>,
}

impl DayMenu {
    pub fn is_empty(&self) -> bool {
        self.mains.is_empty() && self.sides.is_empty()
    }
}

/// The grouped week, Monday through Sunday. Days without dishes are present
/// but empty; presentation decides what to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyMenu {
    pub days: Vec<DayMenu>,
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl WeeklyMenu {
    pub fn for_day(&self, day: Weekday) -> &DayMenu {
        &self.days[day.num_days_from_monday() as usize]
    }

    pub fn dish_count(&self) -> usize {
        self.days.iter().map(|d| d.mains.len() + d.sides.len()).sum()
    }
}

/// Group dishes by weekday, then by category within each day, preserving
/// the order dishes were discovered in the document.
pub fn group_by_day(dishes: Vec<Dish>) -> WeeklyMenu {
    let mut buckets: [(Vec<Dish>, Vec<Dish>); 7] = std::array::from_fn(|_| (Vec::new(), Vec::new()));
    for dish in dishes {
        let slot = &mut buckets[dish.day.num_days_from_monday() as usize];
        match dish.category {
            Category::Main => slot.0.push(dish),
            Category::Side => slot.1.push(dish),
        }
    }
    let days = buckets
        .into_iter()
        .zip(WEEK)
        .map(|((mains, sides), day)| DayMenu { day, mains, sides })
        .collect();
    WeeklyMenu { days }
}
