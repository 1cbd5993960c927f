//! Electricity service v1 dataset table

use super::payload::{IdKind, PayloadShape};
use super::{EndpointDescriptor, HttpMethod};

use super::HttpMethod::{Get, Post};
use super::payload::PayloadShape::{DateRange, DateRangeWithUnit, Empty};

const REGION: bool = true;
const NO_REGION: bool = false;

const fn endpoint(
    name: &'static str,
    method: HttpMethod,
    path: &'static str,
    shape: PayloadShape,
    with_region: bool,
    description: &'static str,
) -> EndpointDescriptor {
    EndpointDescriptor {
        name,
        method,
        path,
        shape,
        with_region,
        requires_ticket: true,
        description,
    }
}

const PLANT_ID: PayloadShape = PayloadShape::DateRangeWithPlant {
    field: "powerPlantId",
};
// The injection-quantity family spells the field in lower camel without the inner capital.
const INJECTION_PLANT_ID: PayloadShape = PayloadShape::DateRangeWithPlant {
    field: "powerplantId",
};

pub(super) static V1: &[EndpointDescriptor] = &[
    // Day-ahead market
    endpoint("mcp", Post, "v1/markets/dam/data/mcp", DateRange, NO_REGION, "Day-ahead market clearing price"),
    endpoint("dam-block-buying", Post, "v1/markets/dam/data/amount-of-block-buying", DateRange, NO_REGION, "Matched block bid quantity"),
    endpoint("dam-block-selling", Post, "v1/markets/dam/data/amount-of-block-selling", DateRange, NO_REGION, "Matched block offer quantity"),
    endpoint("dam-clearing-quantity", Post, "v1/markets/dam/data/clearing-quantity", DateRange, NO_REGION, "Hourly matched quantity"),
    endpoint("dam-trade-volume", Post, "v1/markets/dam/data/day-ahead-market-trade-volume", DateRange, NO_REGION, "Hourly trade value of matched bids"),
    endpoint("dam-flexible-offer-buying-quantity", Post, "v1/markets/dam/data/flexible-offer-buying-quantity", DateRange, NO_REGION, "Flexible bid quantities"),
    endpoint("dam-flexible-offer-selling-quantity", Post, "v1/markets/dam/data/flexible-offer-selling-quantity", DateRange, NO_REGION, "Flexible offer quantities"),
    endpoint("dam-matched-flexible-offer-quantity", Post, "v1/markets/dam/data/matched-flexible-offer-quantity", DateRange, NO_REGION, "Matched flexible offer quantities"),
    endpoint("dam-price-independent-bid", Post, "v1/markets/dam/data/price-independent-bid", DateRange, NO_REGION, "Price independent bids"),
    endpoint("dam-price-independent-offer", Post, "v1/markets/dam/data/price-independent-offer", DateRange, NO_REGION, "Price independent offers"),
    endpoint("dam-side-payments", Post, "v1/markets/dam/data/side-payments", DateRange, NO_REGION, "Side payments"),
    endpoint("dam-submitted-bid-order-volume", Post, "v1/markets/dam/data/submitted-bid-order-volume", DateRange, NO_REGION, "Submitted bid volume"),
    endpoint("dam-submitted-sales-order-volume", Post, "v1/markets/dam/data/submitted-sales-order-volume", DateRange, NO_REGION, "Submitted sales volume"),
    endpoint("merit-order", Post, "v1/markets/dam/data/supply-demand", PayloadShape::SingleDate { field: "date" }, NO_REGION, "Supply and demand curve"),
    // Intraday market
    endpoint("idm-weighted-average-price", Post, "v1/markets/idm/data/weighted-average-price", DateRange, NO_REGION, "Intraday weighted average price"),
    endpoint("idm-transaction-history", Post, "v1/markets/idm/data/transaction-history", DateRange, NO_REGION, "Intraday transaction history"),
    endpoint("idm-trade-value", Post, "v1/markets/idm/data/trade-value", DateRange, NO_REGION, "Intraday trade value"),
    endpoint("idm-min-max-sales-offer-price", Post, "v1/markets/idm/data/min-max-sales-offer-price", DateRange, NO_REGION, "Intraday min/max sales offer price"),
    endpoint("idm-min-max-matching-price", Post, "v1/markets/idm/data/min-max-matching-price", DateRange, NO_REGION, "Intraday min/max matching price"),
    endpoint("idm-min-max-bid-price", Post, "v1/markets/idm/data/min-max-bid-price", DateRange, NO_REGION, "Intraday min/max bid price"),
    endpoint("idm-bid-offer-quantities", Post, "v1/markets/idm/data/bid-offer-quantities", DateRange, NO_REGION, "Intraday bid and offer quantities"),
    endpoint("idm-matching-quantity", Post, "v1/markets/idm/data/matching-quantity", DateRange, NO_REGION, "Intraday matching quantity"),
    // Balancing power market and ancillary services
    endpoint("smp", Post, "v1/markets/bpm/data/system-marginal-price", DateRange, NO_REGION, "System marginal price"),
    endpoint("system-direction", Post, "v1/markets/bpm/data/system-direction", DateRange, NO_REGION, "System direction"),
    endpoint("order-summary-up", Post, "v1/markets/bpm/data/order-summary-up", DateRange, REGION, "Load-up instruction quantities"),
    endpoint("order-summary-down", Post, "v1/markets/bpm/data/order-summary-down", DateRange, REGION, "Load-down instruction quantities"),
    endpoint("secondary-frequency-capacity-price", Post, "v1/markets/ancillary-services/data/secondary-frequency-capacity-price", DateRange, NO_REGION, "Secondary frequency control capacity price"),
    // Consumption
    endpoint("realtime-consumption", Post, "v1/consumption/data/realtime-consumption", DateRange, NO_REGION, "Real-time consumption"),
    // Generation
    endpoint("dpp", Post, "v1/generation/data/dpp", DateRangeWithUnit, REGION, "Final day-ahead production plan"),
    endpoint("dpp-first-version", Post, "v1/generation/data/dpp-first-version", DateRangeWithUnit, REGION, "First day-ahead production plan"),
    endpoint("aic", Post, "v1/generation/data/aic", DateRangeWithUnit, REGION, "Available installed capacity"),
    endpoint("sbfgp", Post, "v1/generation/data/sbfgp", DateRangeWithUnit, REGION, "Settlement based final generation plan"),
    endpoint("realtime-generation", Post, "v1/generation/data/realtime-generation", PLANT_ID, REGION, "Real-time generation"),
    endpoint("injection-quantity", Post, "v1/generation/data/injection-quantity", INJECTION_PLANT_ID, REGION, "Settlement injection quantity"),
    // Lookup lists
    endpoint("powerplant-list", Get, "v1/generation/data/powerplant-list", Empty, NO_REGION, "Real-time generation power plant list"),
    endpoint("injection-quantity-powerplant-list", Post, "v1/generation/data/injection-quantity-powerplant-list", Empty, NO_REGION, "Injection quantity power plant list"),
    endpoint("organization-list", Post, "v1/generation/data/organization-list", DateRange, NO_REGION, "Organization list"),
    endpoint("powerplant-list-for-date-range", Post, "v1/generation/data/powerplant-list-for-date-range", DateRange, NO_REGION, "Power plants active in a date range"),
    endpoint("uevcb-list", Post, "v1/generation/data/uevcb-list", PayloadShape::StartDateWithId { field: "organizationId", id: IdKind::Organization }, NO_REGION, "Bid units of an organization"),
    endpoint("uevcb-list-by-power-plant-id", Post, "v1/markets/data/uevcb-list-by-power-plant-id", PayloadShape::StartDateWithId { field: "powerPlantId", id: IdKind::Plant }, NO_REGION, "Bid units of a power plant"),
    endpoint("licensed-powerplant-list", Post, "v1/renewables/data/licensed-powerplant-list", PayloadShape::SingleDate { field: "period" }, NO_REGION, "Licensed renewable power plants for a period"),
    // Dams
    endpoint("dams-active-fullness", Post, "v1/dams/data/active-fullness", Empty, NO_REGION, "Dam active fullness"),
    endpoint("dams-flow-rate-and-installed-power", Post, "v1/dams/data/flow-rate-and-installed-power", Empty, NO_REGION, "Dam flow rate and installed power"),
    endpoint("dams-water-energy-provision", Post, "v1/dams/data/water-energy-provision", Empty, NO_REGION, "Energy equivalent of stored water"),
    endpoint("dams-daily-volume", Post, "v1/dams/data/daily-volume", Empty, REGION, "Daily dam volume"),
    endpoint("dams-daily-kot", Post, "v1/dams/data/daily-kot", Empty, REGION, "Daily dam water level"),
    endpoint("dams-volume", Post, "v1/dams/data/dam-volume", Empty, REGION, "Dam volume"),
    endpoint("dams-kot", Post, "v1/dams/data/dam-kot", Empty, NO_REGION, "Dam water level"),
];
