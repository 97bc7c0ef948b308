//! Domain layer: catalog and order aggregates, value objects, events.
pub mod aggregates;
pub mod events;
pub mod value_objects;

use validator::ValidationErrors;

/// Flattens validator output into one readable sentence, fields in a stable order.
pub(crate) fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                .collect();
            format!("{field}: {}", reasons.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
