use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::estimates::TripEstimate;
use crate::types::AllocationResult;

pub fn render_allocation_table(result: &AllocationResult) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "#",
        "Unidade",
        "Município",
        "Distância (km)",
        "Espera (dias)",
        "No-show (%)",
        "Custo (R$)",
        "Viagem",
        "Embarques",
        "Score",
    ]);

    for (rank, option) in result.options().enumerate() {
        let rank_cell = if rank == 0 {
            Cell::new("1 *").fg(Color::Green)
        } else {
            Cell::new(rank + 1)
        };
        let details = &option.details;
        table.add_row(Row::from(vec![
            rank_cell,
            Cell::new(&option.facility.name),
            Cell::new(&option.facility.municipality),
            Cell::new(format!("{:.1}", details.distance_km)),
            Cell::new(details.wait_days),
            Cell::new(format!("{:.1}", details.no_show_probability)),
            Cell::new(format!("{:.2}", details.cost)),
            Cell::new(&details.travel_time),
            Cell::new(details.transfers),
            Cell::new(
                option
                    .score
                    .map(|s| format!("{s:.3}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
    }

    let mut out = format!("Paciente: {}\n{table}", result.patient.name);
    for factor in &result.explanation.factors {
        out.push_str("\n  - ");
        out.push_str(&factor.text);
    }
    out
}

pub fn render_estimate_table(estimates: &[TripEstimate]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Distância (km)", "Embarques", "Custo (R$)", "Viagem"]);
    for estimate in estimates {
        table.add_row(vec![
            format!("{:.1}", estimate.distance_km),
            estimate.transfers.to_string(),
            format!("{:.2}", estimate.cost),
            estimate.travel_time.clone(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_table_lists_every_distance() {
        let rendered = render_estimate_table(&[
            TripEstimate::for_distance(5.0),
            TripEstimate::for_distance(25.0),
        ]);
        assert!(rendered.contains("4.30"));
        assert!(rendered.contains("12.90"));
        assert!(rendered.contains("1h15min"));
    }
}
