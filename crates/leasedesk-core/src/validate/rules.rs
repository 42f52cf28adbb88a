use crate::{
    MAX_GROUP_ROWS,
    record::Record,
    schema::{Comparison, FieldKind, FieldSpec, Rule},
    value::Value,
};

/// Every message the field's rules produce against its current value.
///
/// `counted` marks rows of count-driven groups, where each independent field
/// is required whether or not it declares the rule.
pub(crate) fn field_messages(spec: &FieldSpec, record: &Record, counted: bool) -> Vec<String> {
    let mut out = Vec::new();

    if spec.is_derived() {
        return out;
    }

    let value = record.value(&spec.name);

    if value.is_blank() {
        if spec.is_required() || (counted && implicitly_required(&spec.kind)) {
            out.push(format!("{} is required", spec.label));
        }
        return out;
    }

    // kind-level shape
    match &spec.kind {
        FieldKind::Choice { options } => {
            if let Some(text) = value.as_text()
                && !options.iter().any(|o| o == text)
            {
                out.push(format!("Select a valid {}", spec.label.to_lowercase()));
            }
        }
        FieldKind::Count => {
            if value
                .parse_int()
                .is_some_and(|n| usize::try_from(n).is_ok_and(|n| n > MAX_GROUP_ROWS))
            {
                out.push(format!("At most {MAX_GROUP_ROWS} entries are supported"));
            }
        }
        _ => {}
    }

    for rule in &spec.rules {
        match rule {
            Rule::Required => {}
            Rule::Pattern { pattern } => {
                if let Some(text) = value.as_text()
                    && !pattern.matches(text)
                {
                    out.push(pattern.message().to_string());
                }
            }
            Rule::Min { value: min, message } => {
                if value.parse_int().is_some_and(|n| n < *min) {
                    out.push(message.clone());
                }
            }
            Rule::Compare {
                op,
                sibling,
                message,
            } => {
                if compare(*op, value, record.value(sibling)) == Some(false) {
                    out.push(message.clone());
                }
            }
        }
    }

    out
}

const fn implicitly_required(kind: &FieldKind) -> bool {
    !matches!(kind, FieldKind::Flag | FieldKind::Attachment)
}

// None when either side is blank or unreadable; those are reported by the
// required and pattern rules instead.
fn compare(op: Comparison, lhs: &Value, rhs: &Value) -> Option<bool> {
    match (lhs, rhs) {
        (Value::Date(a), Value::Date(b)) => Some(op.holds(a, b)),
        _ => {
            let a = lhs.parse_int()?;
            let b = rhs.parse_int()?;
            Some(op.holds(&a, &b))
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{id::IdGenerator, pattern::Pattern, schema::RecordSchema};

    fn record_with(schema: &RecordSchema, values: &[(&str, Value)]) -> Record {
        let mut record = Record::blank(schema, &mut IdGenerator::seeded(0));
        for (name, value) in values {
            record.put(name, value.clone());
        }
        record
    }

    #[test]
    fn blank_required_field_reports_only_required() {
        let spec = FieldSpec::text("contactNumber", "Contact Number")
            .required()
            .pattern(Pattern::PhoneNumber);
        let schema = RecordSchema::new().with_field(spec.clone());
        let record = record_with(&schema, &[("contactNumber", Value::text("  "))]);

        assert_eq!(
            field_messages(&spec, &record, false),
            vec!["Contact Number is required".to_string()]
        );
    }

    #[test]
    fn counted_rows_require_independent_fields() {
        let spec = FieldSpec::text("address", "Address");
        let flag = FieldSpec::flag("verified", "Verified");
        let schema = RecordSchema::new()
            .with_field(spec.clone())
            .with_field(flag.clone());
        let record = record_with(&schema, &[]);

        assert!(field_messages(&spec, &record, false).is_empty());
        assert_eq!(field_messages(&spec, &record, true).len(), 1);
        assert!(field_messages(&flag, &record, true).is_empty());
    }

    #[test]
    fn relational_rule_needs_both_sides() {
        let filled = FieldSpec::digits("filledRooms", "Filled Rooms")
            .at_most("totalRooms", "occupied cannot exceed total");
        let schema = RecordSchema::new()
            .with_field(FieldSpec::digits("totalRooms", "Total Rooms"))
            .with_field(filled.clone());

        let over = record_with(
            &schema,
            &[("totalRooms", Value::text("8")), ("filledRooms", Value::text("20"))],
        );
        assert_eq!(
            field_messages(&filled, &over, false),
            vec!["occupied cannot exceed total".to_string()]
        );

        let equal = record_with(
            &schema,
            &[("totalRooms", Value::text("8")), ("filledRooms", Value::text("8"))],
        );
        assert!(field_messages(&filled, &equal, false).is_empty());

        let no_total = record_with(&schema, &[("filledRooms", Value::text("20"))]);
        assert!(field_messages(&filled, &no_total, false).is_empty());
    }

    #[test]
    fn choice_outside_options_is_rejected() {
        let spec = FieldSpec::choice("gender", "Gender", ["Male", "Female", "Other"]);
        let schema = RecordSchema::new().with_field(spec.clone());
        let record = record_with(&schema, &[("gender", Value::text("Robot"))]);

        assert_eq!(
            field_messages(&spec, &record, false),
            vec!["Select a valid gender".to_string()]
        );
    }

    #[test]
    fn min_rule_reads_integers() {
        let spec = FieldSpec::count("numTenantProperties", "Number of Tenant Properties")
            .pattern(Pattern::Integer)
            .min(1, "Minimum 1 tenant property is required");
        let schema = RecordSchema::new().with_field(spec.clone());

        let zero = record_with(&schema, &[("numTenantProperties", Value::text("0"))]);
        assert_eq!(
            field_messages(&spec, &zero, false),
            vec!["Minimum 1 tenant property is required".to_string()]
        );

        let junk = record_with(&schema, &[("numTenantProperties", Value::text("two"))]);
        assert_eq!(
            field_messages(&spec, &junk, false),
            vec!["Enter a valid number".to_string()]
        );
    }
}
