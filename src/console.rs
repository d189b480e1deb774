use crate::schema::MeasurementResult;

pub fn render(result: &MeasurementResult) -> String {
    let rate = match result.ops_per_second() {
        Some(ops) => format!("{ops:.0} ops/s"),
        None => "rate undefined (below clock resolution)".to_string(),
    };
    format!(
        "{}: {} iterations, {} us total, {:.3} us/op, {}",
        result.name(),
        result.iterations(),
        result.total_time_us(),
        result.time_per_op_us(),
        rate
    )
}
