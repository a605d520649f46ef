use crate::utils::AvgTracker;
use ahash::AHashMap;
use std::{
    fmt,
    ops::{AddAssign, Index, IndexMut},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reportable {
    Float(f64),
    Int(i64),
    Avg(AvgTracker),
}

macro_rules! reportable_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Reportable {
                fn from(val: $t) -> Self {
                    Reportable::Int(val as i64)
                }
            }
        )*
    };
}

reportable_from_primitive!(usize, u8, u16, u32, u64, isize, i8, i16, i32, i64);

impl From<f64> for Reportable {
    fn from(val: f64) -> Self {
        Reportable::Float(val)
    }
}

impl From<f32> for Reportable {
    fn from(val: f32) -> Self {
        Reportable::Float(val as f64)
    }
}

impl From<AvgTracker> for Reportable {
    fn from(val: AvgTracker) -> Self {
        Reportable::Avg(val)
    }
}

impl Default for Reportable {
    fn default() -> Self {
        Reportable::Float(0.0)
    }
}

impl AddAssign<Reportable> for Reportable {
    fn add_assign(&mut self, other: Reportable) {
        match (self, other) {
            (Reportable::Float(a), Reportable::Float(b)) => *a += b,
            (Reportable::Int(a), Reportable::Int(b)) => *a += b,
            (Reportable::Avg(a), Reportable::Avg(b)) => *a += b,
            (a, b) => *a = b,
        }
    }
}

impl fmt::Display for Reportable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reportable::Float(val) => write!(f, "{val:.4}"),
            Reportable::Int(val) => write!(f, "{val}"),
            Reportable::Avg(avg) => match avg.mean() {
                Some(mean) => write!(f, "{mean:.4}"),
                None => write!(f, "n/a"),
            },
        }
    }
}

impl Reportable {
    /// Numeric value, averages are resolved.
    pub fn value(&self) -> f64 {
        match self {
            Reportable::Float(val) => *val,
            Reportable::Int(val) => *val as f64,
            Reportable::Avg(avg) => avg.mean().unwrap_or(f64::NAN),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Reportable::Int(val) => *val,
            _ => unreachable!("Expected Int, got {self:?}"),
        }
    }

    pub fn as_avg(&self) -> AvgTracker {
        match self {
            Reportable::Avg(avg) => *avg,
            _ => unreachable!("Expected Avg, got {self:?}"),
        }
    }
}

/// Named metrics collected during learning and over a quiz session.
#[derive(Clone, Debug, Default)]
pub struct Report {
    data: AHashMap<String, Reportable>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}Session report{}", "-".repeat(20), "-".repeat(20))?;
        for (key, val) in self.sorted() {
            writeln!(f, "\t{key}: {val}")?;
        }
        Ok(())
    }
}

impl Report {
    pub fn get(&self, key: &str) -> Option<&Reportable> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Entries sorted by key.
    pub fn sorted(&self) -> Vec<(&String, &Reportable)> {
        let mut items: Vec<_> = self.data.iter().collect();
        items.sort_unstable_by(|a, b| a.0.cmp(b.0));
        items
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Index<&str> for Report {
    type Output = Reportable;

    fn index(&self, key: &str) -> &Self::Output {
        &self.data[key]
    }
}

impl Index<String> for Report {
    type Output = Reportable;

    fn index(&self, key: String) -> &Self::Output {
        &self.data[&key]
    }
}

impl IndexMut<String> for Report {
    fn index_mut(&mut self, key: String) -> &mut Self::Output {
        self.data.entry(key).or_default()
    }
}

impl IndexMut<&str> for Report {
    fn index_mut(&mut self, key: &str) -> &mut Self::Output {
        self.data.entry(key.to_string()).or_default()
    }
}

impl AddAssign<&Report> for Report {
    fn add_assign(&mut self, other: &Report) {
        for (key, val) in other.data.iter() {
            self[key.as_str()] += *val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_matching_kinds() {
        let mut total = Report::default();
        let mut step = Report::default();
        step["Questions"] = 1usize.into();
        step["Value loss"] = AvgTracker::new(0.5, 1).into();

        total += &step;
        total += &step;

        assert_eq!(total["Questions"].as_int(), 2);
        assert_eq!(total["Value loss"].as_avg().samples(), 2);
        assert!((total["Value loss"].value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn display_is_sorted() {
        let mut report = Report::default();
        report["b"] = 2i64.into();
        report["a"] = 1.5f64.into();

        let text = report.to_string();
        let a = text.find("a: 1.5000").unwrap();
        let b = text.find("b: 2").unwrap();
        assert!(a < b);
    }
}
