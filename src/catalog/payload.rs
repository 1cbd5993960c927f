//! Request body assembly for each payload shape

use chrono::NaiveDate;
use serde_json::{Map, Value, json};

use super::RequestError;
use super::dates::{DateRange, start_of_day};

/// Region code sent by datasets that default to the whole national grid
pub const DEFAULT_REGION: &str = "TR1";

/// Which caller-supplied identifier a required-id shape consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Organization,
    Plant,
}

/// The body layouts used across the endpoint catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{startDate, endDate}`
    DateRange,
    /// Date range plus `organizationId` and `uevcbId`, both or neither
    DateRangeWithUnit,
    /// Date range plus an optional plant id stored under `field`
    DateRangeWithPlant { field: &'static str },
    /// One day anchored at midnight, stored under `field`
    SingleDate { field: &'static str },
    /// `startDate` plus a required id stored under `field`
    StartDateWithId { field: &'static str, id: IdKind },
    /// No parameters
    Empty,
}

impl PayloadShape {
    /// Short label used by the `datasets` listing
    pub fn label(&self) -> &'static str {
        match self {
            PayloadShape::DateRange => "date-range",
            PayloadShape::DateRangeWithUnit => "date-range+unit",
            PayloadShape::DateRangeWithPlant { .. } => "date-range+plant",
            PayloadShape::SingleDate { .. } => "date",
            PayloadShape::StartDateWithId { .. } => "date+id",
            PayloadShape::Empty => "none",
        }
    }
}

/// Per-call parameters; which ones are meaningful depends on the shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pub range: Option<DateRange>,
    pub date: Option<NaiveDate>,
    pub organization_id: Option<i64>,
    pub uevcb_id: Option<i64>,
    pub plant_id: Option<i64>,
}

impl RequestParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_range(range: DateRange) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, organization_id: Option<i64>, uevcb_id: Option<i64>) -> Self {
        self.organization_id = organization_id;
        self.uevcb_id = uevcb_id;
        self
    }

    pub fn with_organization(mut self, organization_id: i64) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn with_plant(mut self, plant_id: Option<i64>) -> Self {
        self.plant_id = plant_id;
        self
    }

    /// Names of the parameters that were supplied
    pub(crate) fn supplied(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.range.is_some() {
            names.push("date range");
        }
        if self.date.is_some() {
            names.push("date");
        }
        if self.organization_id.is_some() {
            names.push("organization id");
        }
        if self.uevcb_id.is_some() {
            names.push("uevcb id");
        }
        if self.plant_id.is_some() {
            names.push("plant id");
        }
        names
    }
}

/// Parameter names a shape consumes
pub(crate) fn accepted(shape: PayloadShape) -> &'static [&'static str] {
    match shape {
        PayloadShape::DateRange => &["date range"],
        PayloadShape::DateRangeWithUnit => &["date range", "organization id", "uevcb id"],
        PayloadShape::DateRangeWithPlant { .. } => &["date range", "plant id"],
        PayloadShape::SingleDate { .. } => &["date"],
        PayloadShape::StartDateWithId {
            id: IdKind::Organization,
            ..
        } => &["date", "organization id"],
        PayloadShape::StartDateWithId {
            id: IdKind::Plant, ..
        } => &["date", "plant id"],
        PayloadShape::Empty => &[],
    }
}

/// Assemble the JSON body for `shape`.
///
/// Optional ids are omitted entirely when absent, never sent as `null`.
/// `with_region` appends the national region default.
pub fn build_body(
    shape: PayloadShape,
    with_region: bool,
    params: &RequestParams,
) -> Result<Value, RequestError> {
    let mut body = Map::new();

    match shape {
        PayloadShape::DateRange => {
            insert_range(&mut body, params)?;
        }
        PayloadShape::DateRangeWithUnit => {
            // Validate ids before anything else so a half-specified unit never
            // reaches the network.
            let unit = match (params.organization_id, params.uevcb_id) {
                (Some(org), Some(uevcb)) => Some((org, uevcb)),
                (None, None) => None,
                _ => return Err(RequestError::PartialUnitIds),
            };
            insert_range(&mut body, params)?;
            if let Some((org, uevcb)) = unit {
                body.insert("organizationId".into(), json!(org));
                body.insert("uevcbId".into(), json!(uevcb));
            }
        }
        PayloadShape::DateRangeWithPlant { field } => {
            insert_range(&mut body, params)?;
            if let Some(plant_id) = params.plant_id {
                body.insert(field.into(), json!(plant_id));
            }
        }
        PayloadShape::SingleDate { field } => {
            let date = params.date.ok_or(RequestError::MissingDate)?;
            body.insert(field.into(), json!(start_of_day(date)));
        }
        PayloadShape::StartDateWithId { field, id } => {
            let date = params.date.ok_or(RequestError::MissingDate)?;
            let value = match id {
                IdKind::Organization => params.organization_id,
                IdKind::Plant => params.plant_id,
            }
            .ok_or(RequestError::MissingIdentifier(field))?;
            body.insert("startDate".into(), json!(start_of_day(date)));
            body.insert(field.into(), json!(value));
        }
        PayloadShape::Empty => {}
    }

    if with_region {
        body.insert("region".into(), json!(DEFAULT_REGION));
    }

    Ok(Value::Object(body))
}

fn insert_range(body: &mut Map<String, Value>, params: &RequestParams) -> Result<(), RequestError> {
    let range = params.range.ok_or(RequestError::MissingDateRange)?;
    body.insert("startDate".into(), json!(range.start_timestamp()));
    body.insert("endDate".into(), json!(range.end_timestamp()));
    Ok(())
}
