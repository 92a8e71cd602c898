use anyhow::Result;
use serde::Serialize;

/// Pretty JSON in the key layout the results view reads.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::render_json;
    use crate::estimates::TripEstimate;

    #[test]
    fn estimates_use_results_view_keys() {
        let rendered = render_json(&[TripEstimate::for_distance(20.0)]).expect("json");
        assert!(rendered.contains("\"tempoViagem\": \"1h\""));
        assert!(rendered.contains("\"numeroTransferencias\": 3"));
    }
}
