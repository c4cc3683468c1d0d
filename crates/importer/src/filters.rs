//! Row predicates for candidate tables: ad-hoc conditions, named presets,
//! and Gaussian limit tests.

use std::fmt;
use std::str::FromStr;

use transit_core::constants::JUPITER_RADIUS_IN_EARTH;

use crate::ImportError;
use crate::catalog::CatalogRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
        }
    }
}

/// `column op value` over a numeric column. Blank or non-numeric cells never match.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Comparison,
    pub value: f64,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: Comparison, value: f64) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    pub fn matches(&self, row: &CatalogRow<'_>) -> bool {
        row.number(&self.column)
            .filter(|v| v.is_finite())
            .is_some_and(|v| self.op.apply(v, self.value))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op.symbol(), self.value)
    }
}

impl FromStr for Condition {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ImportError::InvalidCondition(s.to_string());
        let at = s.find(['<', '>', '=', '!']).ok_or_else(invalid)?;
        let (column, rest) = s.split_at(at);
        let (op, value) = [
            ("<=", Comparison::Le),
            (">=", Comparison::Ge),
            ("!=", Comparison::Ne),
            ("==", Comparison::Eq),
            ("<", Comparison::Lt),
            (">", Comparison::Gt),
            ("=", Comparison::Eq),
        ]
        .into_iter()
        .find_map(|(symbol, op)| rest.strip_prefix(symbol).map(|value| (op, value)))
        .ok_or_else(invalid)?;
        let column = column.trim();
        if column.is_empty() {
            return Err(invalid());
        }
        let value = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(invalid)?;
        Ok(Condition::new(column, op, value))
    }
}

const RP: &str = "Planet Radius (R_Earth)";
const PERIOD: &str = "Period (days)";
const TEQ: &str = "Planet Equil Temp (K)";
const RSTAR: &str = "Stellar Radius (R_Sun)";
const TEFF: &str = "Stellar Eff Temp (K)";

/// Named selections over the TOI table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Deep,
    HiSnr,
    North,
    South,
    Bright,
    Cool,
    HotStar,
    Dwarf,
    Giant,
    Sunlike,
    Nearby,
    Young,
    HotPlanet,
    Temperate,
    Small,
    SubEarth,
    EarthLike,
    SuperEarth,
    SubNeptune,
    SubSaturn,
    Large,
    Short,
    Long,
    Tropical,
    Usp,
    HotJupiter,
    RadiusGap,
}

impl Preset {
    pub fn all() -> &'static [Preset] {
        use Preset::*;
        &[
            Deep, HiSnr, North, South, Bright, Cool, HotStar, Dwarf, Giant, Sunlike, Nearby, Young,
            HotPlanet, Temperate, Small, SubEarth, EarthLike, SuperEarth, SubNeptune, SubSaturn,
            Large, Short, Long, Tropical, Usp, HotJupiter, RadiusGap,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Deep => "deep",
            Preset::HiSnr => "hi-snr",
            Preset::North => "north",
            Preset::South => "south",
            Preset::Bright => "bright",
            Preset::Cool => "cool",
            Preset::HotStar => "hot-star",
            Preset::Dwarf => "dwarf",
            Preset::Giant => "giant",
            Preset::Sunlike => "sunlike",
            Preset::Nearby => "nearby",
            Preset::Young => "young",
            Preset::HotPlanet => "hot-planet",
            Preset::Temperate => "temperate",
            Preset::Small => "small",
            Preset::SubEarth => "sub-earth",
            Preset::EarthLike => "earth-like",
            Preset::SuperEarth => "super-earth",
            Preset::SubNeptune => "sub-neptune",
            Preset::SubSaturn => "sub-saturn",
            Preset::Large => "large",
            Preset::Short => "short",
            Preset::Long => "long",
            Preset::Tropical => "tropical",
            Preset::Usp => "usp",
            Preset::HotJupiter => "hot-jupiter",
            Preset::RadiusGap => "radius-gap",
        }
    }

    /// Conditions that must all hold.
    pub fn conditions(self) -> Vec<Condition> {
        use Comparison::*;
        let c = Condition::new;
        match self {
            Preset::Deep => vec![c("Depth (ppm)", Gt, 1000.0)],
            Preset::HiSnr => vec![c("Planet SNR", Gt, 10.0)],
            Preset::North => vec![c("Dec", Gt, 20.0)],
            Preset::South => vec![c("Dec", Lt, -20.0)],
            Preset::Bright => vec![c("TESS Mag", Lt, 10.0)],
            Preset::Cool => vec![c(TEFF, Lt, 3500.0)],
            Preset::HotStar => vec![c(TEFF, Gt, 6500.0)],
            Preset::Dwarf => vec![c(RSTAR, Lt, 0.6)],
            Preset::Giant => vec![c(RSTAR, Gt, 1.6)],
            Preset::Sunlike => vec![
                c(RSTAR, Ge, 0.5),
                c(RSTAR, Lt, 1.5),
                c(TEFF, Gt, 5500.0),
                c(TEFF, Lt, 6000.0),
            ],
            Preset::Nearby => vec![c("Stellar Distance (pc)", Lt, 100.0)],
            Preset::Young => vec![c("Stellar log(g) (cm/s^2)", Gt, 4.5)],
            Preset::HotPlanet => vec![c(TEQ, Gt, 1000.0)],
            Preset::Temperate => vec![c(TEQ, Gt, 500.0), c(TEQ, Lt, 1000.0)],
            Preset::Small => vec![c(RP, Lt, 4.0)],
            Preset::SubEarth => vec![c(RP, Lt, 1.0)],
            Preset::EarthLike => vec![c(RP, Ge, 1.0), c(RP, Lt, 1.5)],
            Preset::SuperEarth => vec![c(RP, Ge, 1.5), c(RP, Lt, 2.0)],
            Preset::SubNeptune => vec![c(RP, Ge, 2.0), c(RP, Lt, 4.0)],
            Preset::SubSaturn => vec![c(RP, Gt, 4.0), c(RP, Le, 11.0)],
            Preset::Large => vec![c(RP, Gt, JUPITER_RADIUS_IN_EARTH)],
            Preset::Short => vec![c(PERIOD, Lt, 3.0)],
            Preset::Long => vec![c(PERIOD, Gt, 10.0)],
            Preset::Tropical => vec![c(PERIOD, Ge, 5.0), c(PERIOD, Le, 10.0)],
            Preset::Usp => vec![c(PERIOD, Le, 1.0)],
            Preset::HotJupiter => vec![c(PERIOD, Lt, 3.0), c(RP, Gt, JUPITER_RADIUS_IN_EARTH)],
            Preset::RadiusGap => vec![c(RP, Ge, 3.8), c(RP, Le, 4.0)],
        }
    }

    pub fn matches(self, row: &CatalogRow<'_>) -> bool {
        self.conditions().iter().all(|cond| cond.matches(row))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Preset::all()
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ImportError::UnknownPreset(s.to_string()))
    }
}

/// Normal CDF at `x` for mean `mu` and standard deviation `sigma`.
pub fn normal_cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    0.5 * libm::erfc(-(x - mu) / (sigma * std::f64::consts::SQRT_2))
}

/// A measurement `mu ± sigma` is consistent with being above `lower` at `n_sigma`.
pub fn above_lower_limit(lower: f64, mu: f64, sigma: f64, n_sigma: f64) -> bool {
    normal_cdf(lower, mu, sigma) < normal_cdf(n_sigma, 0.0, 1.0)
}

/// A measurement `mu ± sigma` is consistent with being below `upper` at `n_sigma`.
pub fn below_upper_limit(upper: f64, mu: f64, sigma: f64, n_sigma: f64) -> bool {
    normal_cdf(upper, mu, sigma) > normal_cdf(-n_sigma, 0.0, 1.0)
}

pub fn between_limits(lower: f64, upper: f64, mu: f64, sigma: f64, n_sigma: f64) -> bool {
    above_lower_limit(lower, mu, sigma, n_sigma) && below_upper_limit(upper, mu, sigma, n_sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogKind, CatalogTable};
    use proptest::prelude::*;

    fn table() -> CatalogTable {
        CatalogTable::from_reader(
            CatalogKind::Toi,
            "\
TOI,Dec,Planet Radius (R_Earth),Period (days),Stellar Radius (R_Sun),Stellar Eff Temp (K)
1.01,+45:00:00,13.0,2.1,1.1,5800
2.01,-30:00:00,1.2,0.7,0.4,3300
3.01,+05:00:00,,12.0,1.0,5700
"
            .as_bytes(),
        )
        .unwrap()
    }

    fn ids(table: &CatalogTable) -> Vec<String> {
        table.rows().filter_map(|r| r.get("TOI")).map(String::from).collect()
    }

    #[test]
    fn parses_conditions() {
        assert_eq!(
            "Period (days) <= 3".parse::<Condition>().unwrap(),
            Condition::new("Period (days)", Comparison::Le, 3.0)
        );
        assert_eq!(
            "TESS Mag<10.5".parse::<Condition>().unwrap(),
            Condition::new("TESS Mag", Comparison::Lt, 10.5)
        );
        assert_eq!("Depth (ppm) != 0".parse::<Condition>().unwrap().op, Comparison::Ne);
        assert!("Period (days)".parse::<Condition>().is_err());
        assert!("< 3".parse::<Condition>().is_err());
        assert!("Period (days) > abc".parse::<Condition>().is_err());
    }

    #[test]
    fn presets_select_expected_rows() {
        let t = table();
        assert_eq!(ids(&t.filter(|r| Preset::HotJupiter.matches(r))), vec!["1.01"]);
        assert_eq!(ids(&t.filter(|r| Preset::North.matches(r))), vec!["1.01"]);
        assert_eq!(ids(&t.filter(|r| Preset::South.matches(r))), vec!["2.01"]);
        assert_eq!(
            ids(&t.filter(|r| Preset::Usp.matches(r) && Preset::EarthLike.matches(r))),
            vec!["2.01"]
        );
        assert_eq!(ids(&t.filter(|r| Preset::Sunlike.matches(r))), vec!["1.01", "3.01"]);
        // Blank radius never matches.
        assert_eq!(ids(&t.filter(|r| Preset::Small.matches(r))), vec!["2.01"]);
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in Preset::all() {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), *preset);
        }
        assert_eq!("HOT_JUPITER".parse::<Preset>().unwrap(), Preset::HotJupiter);
        assert!("warm".parse::<Preset>().is_err());
        assert_eq!(Preset::all().len(), 27);
    }

    #[test]
    fn normal_cdf_reference_values() {
        assert!((normal_cdf(0.0, 0.0, 1.0) - 0.5).abs() < 1e-15);
        assert!((normal_cdf(1.0, 0.0, 1.0) - 0.841_344_746_068_543).abs() < 1e-12);
        assert!((normal_cdf(-1.96, 0.0, 1.0) - 0.024_997_895_148_220).abs() < 1e-12);
    }

    #[test]
    fn far_tail_keeps_relative_precision() {
        // Φ(-8) = 6.22096e-16; a 1 - erf form rounds this to zero.
        let p = normal_cdf(-8.0, 0.0, 1.0);
        assert!((p / 6.220_960_574_271_785e-16 - 1.0).abs() < 1e-9, "p = {p}");
        assert_eq!(normal_cdf(9.5, 10.0, 1.0), normal_cdf(-0.5, 0.0, 1.0));
    }

    #[test]
    fn gaussian_limits() {
        // 10 ± 1 clears a lower limit of 9.5 at 1 sigma but not one of 11.5.
        assert!(above_lower_limit(9.5, 10.0, 1.0, 1.0));
        assert!(!above_lower_limit(11.5, 10.0, 1.0, 1.0));
        assert!(below_upper_limit(10.5, 10.0, 1.0, 1.0));
        assert!(!below_upper_limit(8.5, 10.0, 1.0, 1.0));
        assert!(between_limits(9.5, 10.5, 10.0, 1.0, 1.0));
        assert!(!between_limits(11.5, 12.0, 10.0, 1.0, 1.0));
    }

    proptest! {
        #[test]
        fn cdf_is_monotonic_and_bounded(a in -50.0f64..50.0, b in -50.0f64..50.0, sigma in 0.1f64..10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (p_lo, p_hi) = (normal_cdf(lo, 0.0, sigma), normal_cdf(hi, 0.0, sigma));
            prop_assert!(p_lo <= p_hi + 1e-6);
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&p_lo));
        }
    }
}
