//! Plain-text rendering of the wizard state

use reserve_core::summary::format_cents;
use reserve_core::{BookingReceipt, BookingStep, BookingWizard, CartStore, OrderSummary, RoomView};
use shared::MenuItem;
use shared::time_format::format_time;

pub fn print_status(wizard: &BookingWizard, menu: Option<&[MenuItem]>) {
    let session = wizard.session();
    println!("Step {}", session.step);

    if let Some(receipt) = wizard.receipt() {
        print_receipt(receipt);
        return;
    }

    println!(
        "  Date:      {}",
        session
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Time:      {}",
        session.time.as_ref().map(format_time).unwrap_or_else(|| "-".to_string())
    );
    println!("  Guests:    {}", session.guest_count);
    println!(
        "  Location:  {}{}",
        session.location_type,
        if session.audio_needed { " (audio)" } else { "" }
    );
    if let Some(room) = &session.selected_room {
        println!("  Room:      #{} {}", room.id, room.name);
    }
    if !session.customer_name.is_empty() || !session.customer_phone.is_empty() {
        println!("  Contact:   {} {}", session.customer_name, session.customer_phone);
    }
    if !session.note.is_empty() {
        println!("  Note:      {}", session.note);
    }

    let dishes = wizard.merged_dishes();
    if session.step == BookingStep::Confirm {
        let summary = OrderSummary::build(&dishes, menu.unwrap_or(&[]), session.selected_room.as_ref());
        print_summary(&summary);
    } else if !dishes.is_empty() {
        println!("  Dishes:");
        for (id, qty) in &dishes {
            println!("    {} x{}", id, qty);
        }
    }

    if let Some(err) = wizard.last_error() {
        println!("! {}", err);
    }
}

pub fn print_summary(summary: &OrderSummary) {
    if summary.is_empty() {
        println!("  No dishes selected");
    }
    for line in &summary.lines {
        let marker = if line.known { "" } else { " (not on menu)" };
        println!(
            "    {:<24} x{:<3} {:>10}{}",
            line.name,
            line.quantity,
            format_cents(line.line_total),
            marker
        );
    }
    if summary.room_surcharge > 0 {
        println!("    {:<28} {:>10}", "Room surcharge", format_cents(summary.room_surcharge));
    }
    println!("    {:<28} {:>10}", "Total", format_cents(summary.total));
}

pub fn print_rooms(rooms: &[RoomView]) {
    if rooms.is_empty() {
        println!("No rooms match these filters");
        return;
    }
    for room in rooms {
        let state = if room.booked_for_date {
            "booked"
        } else if !room.is_available {
            "unavailable"
        } else {
            "available"
        };
        println!(
            "#{:<4} {:<24} {:>3} seats  {:<11} {}",
            room.id,
            room.name,
            room.capacity,
            state,
            room.amenities.join(", ")
        );
    }
}

pub fn print_menu(menu: &[MenuItem], cart: &CartStore) {
    for item in menu.iter().filter(|i| i.is_available) {
        let qty = cart.quantity(&item.id);
        let in_cart = if qty > 0 { format!("  [x{}]", qty) } else { String::new() };
        println!(
            "{:<8} {:<28} {:>10}{}",
            item.id,
            item.name,
            format_cents(item.price),
            in_cart
        );
    }
    println!("Cart: {} item(s)", cart.total_quantity());
}

pub fn print_receipt(receipt: &BookingReceipt) {
    println!("Booking confirmed");
    println!("  Booking id: {}", receipt.confirmation.id);
    if let Some(reference) = &receipt.confirmation.reference {
        println!("  Reference:  {}", reference);
    }
    println!("  Name:       {}", receipt.customer_name);
    println!("  Phone:      {}", receipt.customer_phone);
}
