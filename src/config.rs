use crate::error::{PelotonError, PtResult};
use crate::fantasy::PointTables;
use crate::generator::Triangle;
use crate::riders::TierTable;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub race: RaceParams,
    #[command(flatten)]
    pub points: PointParams,
    #[command(flatten)]
    pub tiers: TierParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceParams {
    /// Riders strictly younger than this ride for the youth classification.
    #[arg(long, default_value_t = 24)]
    pub youth_age_limit: u8,
    /// Global multiplier applied to every per-stage abandonment probability.
    #[arg(long, default_value_t = 1.0)]
    pub abandon_scale: f64,
}

impl Default for RaceParams {
    fn default() -> Self {
        Self {
            youth_age_limit: 24,
            abandon_scale: 1.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointParams {
    #[arg(long, default_value = "20,15,12,9,7,5,4,3,2,1")]
    pub regular_points: String,
    #[arg(long, default_value = "30,20,15,12,10,8,6,4,2,1")]
    pub special_points: String,
    #[arg(long, default_value = "5,13,14,17,18")]
    pub special_stages: String,
    #[arg(long, default_value = "5,4,3,2,1")]
    pub bonus_points: String,
}

impl Default for PointParams {
    fn default() -> Self {
        Self {
            regular_points: "20,15,12,9,7,5,4,3,2,1".to_string(),
            special_points: "30,20,15,12,10,8,6,4,2,1".to_string(),
            special_stages: "5,13,14,17,18".to_string(),
            bonus_points: "5,4,3,2,1".to_string(),
        }
    }
}

// Tier triples are "min,mode,max" finishing positions.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierParams {
    #[arg(long, default_value = "1,1,10")]
    pub tier_exceptional: String,
    #[arg(long, default_value = "1,3,20")]
    pub tier_world_class: String,
    #[arg(long, default_value = "1,6,30")]
    pub tier_elite: String,
    #[arg(long, default_value = "1,15,40")]
    pub tier_very_good: String,
    #[arg(long, default_value = "5,20,50")]
    pub tier_good: String,
    #[arg(long, default_value = "20,30,60")]
    pub tier_average: String,
    #[arg(long, default_value = "50,75,150")]
    pub tier_below_average: String,
}

impl Default for TierParams {
    fn default() -> Self {
        Self {
            tier_exceptional: "1,1,10".to_string(),
            tier_world_class: "1,3,20".to_string(),
            tier_elite: "1,6,30".to_string(),
            tier_very_good: "1,15,40".to_string(),
            tier_good: "5,20,50".to_string(),
            tier_average: "20,30,60".to_string(),
            tier_below_average: "50,75,150".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> PtResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies every value the user typed on the command line over `self`,
    /// leaving file-provided values alone where clap only supplied a default.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(race.youth_age_limit);
        update_if_present!(race.abandon_scale);

        update_if_present!(points.regular_points);
        update_if_present!(points.special_points);
        update_if_present!(points.special_stages);
        update_if_present!(points.bonus_points);

        update_if_present!(tiers.tier_exceptional);
        update_if_present!(tiers.tier_world_class);
        update_if_present!(tiers.tier_elite);
        update_if_present!(tiers.tier_very_good);
        update_if_present!(tiers.tier_good);
        update_if_present!(tiers.tier_average);
        update_if_present!(tiers.tier_below_average);
    }
}

impl RaceParams {
    pub fn validate(&self) -> PtResult<()> {
        if !self.abandon_scale.is_finite() || self.abandon_scale < 0.0 {
            return Err(PelotonError::Config(format!(
                "abandon_scale must be a non-negative number, got {}",
                self.abandon_scale
            )));
        }
        Ok(())
    }
}

impl PointParams {
    pub fn tables(&self) -> PtResult<PointTables> {
        let regular = parse_array::<u32, 10>(&self.regular_points, "regular_points")?;
        let special = parse_array::<u32, 10>(&self.special_points, "special_points")?;
        let bonus = parse_array::<u32, 5>(&self.bonus_points, "bonus_points")?;
        let special_stages = parse_list::<usize>(&self.special_stages, "special_stages")?;
        PointTables::new(regular, special, special_stages, bonus)
    }
}

impl TierParams {
    pub fn table(&self) -> PtResult<TierTable> {
        let tiers = [
            parse_triangle(&self.tier_exceptional, "tier_exceptional")?,
            parse_triangle(&self.tier_world_class, "tier_world_class")?,
            parse_triangle(&self.tier_elite, "tier_elite")?,
            parse_triangle(&self.tier_very_good, "tier_very_good")?,
            parse_triangle(&self.tier_good, "tier_good")?,
            parse_triangle(&self.tier_average, "tier_average")?,
            parse_triangle(&self.tier_below_average, "tier_below_average")?,
        ];
        TierTable::new(tiers)
    }
}

fn parse_triangle(s: &str, name: &str) -> PtResult<Triangle> {
    let [min, mode, max] = parse_array::<f64, 3>(s, name)?;
    Triangle::new(min, mode, max)
        .map_err(|e| PelotonError::Config(format!("--{}: {}", name, e)))
}

fn parse_list<T: std::str::FromStr>(s: &str, name: &str) -> PtResult<Vec<T>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse()
                .map_err(|_| PelotonError::Config(format!("Invalid number '{}' in {}", p, name)))
        })
        .collect()
}

fn parse_array<T: std::str::FromStr + Copy + Default, const N: usize>(
    s: &str,
    name: &str,
) -> PtResult<[T; N]> {
    let values = parse_list::<T>(s, name)?;
    if values.len() != N {
        return Err(PelotonError::Config(format!(
            "--{} requires {} values, got {}",
            name,
            N,
            values.len()
        )));
    }
    let mut arr = [T::default(); N];
    arr.copy_from_slice(&values);
    Ok(arr)
}
