use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::inference::{FeatureMap, FeatureValue};
use crate::schema::{Validate, ValidationError};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UserInput {
    /// Body mass index of the insured person
    pub bmi: f64,

    pub age_group: AgeGroup,

    pub lifestyle_risk: LifestyleRisk,

    /// Tier of the city the person lives in, 1 being the largest cities
    pub city_tier: CityTier,

    /// Yearly income in lakhs per annum
    pub income_lpa: f64,

    pub occupation: Occupation,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum AgeGroup {
    Young,
    Adult,
    MiddleAged,
    Senior,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum LifestyleRisk {
    Low,
    Medium,
    High,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum CityTier {
    Tier1,
    Tier2,
    Tier3,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Occupation {
    Salaried,
    SelfEmployed,
    BusinessOwner,
    Freelancer,
    GovernmentJob,
    PrivateJob,
    Student,
    Retired,
    Unemployed,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Young => "young",
            AgeGroup::Adult => "adult",
            AgeGroup::MiddleAged => "middle_aged",
            AgeGroup::Senior => "senior",
        }
    }
}

impl LifestyleRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifestyleRisk::Low => "low",
            LifestyleRisk::Medium => "medium",
            LifestyleRisk::High => "high",
        }
    }
}

impl Occupation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occupation::Salaried => "salaried",
            Occupation::SelfEmployed => "self_employed",
            Occupation::BusinessOwner => "business_owner",
            Occupation::Freelancer => "freelancer",
            Occupation::GovernmentJob => "government_job",
            Occupation::PrivateJob => "private_job",
            Occupation::Student => "student",
            Occupation::Retired => "retired",
            Occupation::Unemployed => "unemployed",
        }
    }
}

impl TryFrom<u8> for CityTier {
    type Error = String;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        match tier {
            1 => Ok(CityTier::Tier1),
            2 => Ok(CityTier::Tier2),
            3 => Ok(CityTier::Tier3),
            _ => Err(format!("city_tier must be 1, 2 or 3, got {tier}")),
        }
    }
}

impl From<CityTier> for u8 {
    fn from(tier: CityTier) -> Self {
        match tier {
            CityTier::Tier1 => 1,
            CityTier::Tier2 => 2,
            CityTier::Tier3 => 3,
        }
    }
}

impl Display for CityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

impl UserInput {
    /// Projects the record into the feature mapping the model consumes, one entry per field.
    pub fn to_features(&self) -> FeatureMap {
        FeatureMap::from([
            ("bmi", FeatureValue::Number(self.bmi)),
            ("age_group", FeatureValue::Category(self.age_group.as_str())),
            (
                "lifestyle_risk",
                FeatureValue::Category(self.lifestyle_risk.as_str()),
            ),
            (
                "city_tier",
                FeatureValue::Number(u8::from(self.city_tier).into()),
            ),
            ("income_lpa", FeatureValue::Number(self.income_lpa)),
            (
                "occupation",
                FeatureValue::Category(self.occupation.as_str()),
            ),
        ])
    }
}

impl Validate for UserInput {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("bmi", self.bmi), ("income_lpa", self.income_lpa)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::NotPositive { field });
            }
        }
        Ok(())
    }
}
