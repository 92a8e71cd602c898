use anyhow::Result;

use crate::estimates::TripEstimate;
use crate::types::AllocationResult;

pub fn allocation_to_csv(result: &AllocationResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rank",
        "facility_id",
        "facility",
        "municipality",
        "distance_km",
        "wait_days",
        "no_show_pct",
        "cost",
        "travel_time",
        "transfers",
        "score",
    ])?;
    for (rank, option) in result.options().enumerate() {
        let details = &option.details;
        writer.write_record([
            (rank + 1).to_string(),
            option.facility.id.to_string(),
            option.facility.name.clone(),
            option.facility.municipality.clone(),
            format!("{:.2}", details.distance_km),
            details.wait_days.to_string(),
            format!("{:.1}", details.no_show_probability),
            format!("{:.2}", details.cost),
            details.travel_time.clone(),
            details.transfers.to_string(),
            option.score.map(|s| format!("{s:.4}")).unwrap_or_default(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn estimates_to_csv(estimates: &[TripEstimate]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["distance_km", "transfers", "cost", "travel_time"])?;
    for estimate in estimates {
        writer.write_record([
            format!("{:.2}", estimate.distance_km),
            estimate.transfers.to_string(),
            format!("{:.2}", estimate.cost),
            estimate.travel_time.clone(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
