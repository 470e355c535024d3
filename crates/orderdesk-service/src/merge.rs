use orderdesk_core::{
    Customer, CustomerInput, DeskError, DeskResult, Order, OrderLineInput, RecordId,
};

pub(crate) fn required_text(label: &str, value: &str) -> DeskResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DeskError::validation(format!("{label} is required")));
    }
    Ok(value.to_string())
}

/// Builds the full record a replace writes: absent text becomes `None`,
/// absent amounts become zero. The agent must already be resolved.
pub fn replacement_customer(input: &CustomerInput, agent_id: RecordId) -> DeskResult<Customer> {
    let name = required_text("customer name", input.name.as_deref().unwrap_or_default())?;

    Ok(Customer {
        id: input.id,
        name,
        city: input.city.clone(),
        country: input.country.clone(),
        grade: input.grade.clone(),
        phone: input.phone.clone(),
        working_area: input.working_area.clone(),
        opening_amount: input.opening_amount.unwrap_or_default(),
        outstanding_amount: input.outstanding_amount.unwrap_or_default(),
        payment_amount: input.payment_amount.unwrap_or_default(),
        receive_amount: input.receive_amount.unwrap_or_default(),
        agent_id,
    })
}

/// Overwrites the scalar fields present in `patch`. The agent reference and
/// order lines need the store and are handled by the caller.
pub fn merge_customer(target: &mut Customer, patch: &CustomerInput) -> DeskResult<()> {
    if let Some(name) = &patch.name {
        target.name = required_text("customer name", name)?;
    }
    if let Some(city) = &patch.city {
        target.city = Some(city.clone());
    }
    if let Some(country) = &patch.country {
        target.country = Some(country.clone());
    }
    if let Some(grade) = &patch.grade {
        target.grade = Some(grade.clone());
    }
    if let Some(phone) = &patch.phone {
        target.phone = Some(phone.clone());
    }
    if let Some(working_area) = &patch.working_area {
        target.working_area = Some(working_area.clone());
    }
    if let Some(amount) = patch.opening_amount {
        target.opening_amount = amount;
    }
    if let Some(amount) = patch.outstanding_amount {
        target.outstanding_amount = amount;
    }
    if let Some(amount) = patch.payment_amount {
        target.payment_amount = amount;
    }
    if let Some(amount) = patch.receive_amount {
        target.receive_amount = amount;
    }
    Ok(())
}

pub(crate) fn order_from_line(
    id: RecordId,
    line: &OrderLineInput,
    customer_id: RecordId,
    payment_ids: Vec<RecordId>,
) -> Order {
    Order {
        id,
        amount: line.amount,
        advance_amount: line.advance_amount,
        description: line.description.clone(),
        customer_id,
        payment_ids,
    }
}
