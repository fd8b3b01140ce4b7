//! Slot session example
//!
//! Types an expression into a slot, watches change notifications, and maps
//! carets between the source text and the generated Java code.

use slot_core::{CaretPos, Projection, Slot, SlotChangeType, SlotConfig};

fn main() {
    println!("=== Slot session ===\n");

    let mut slot = Slot::new(SlotConfig::expression());
    slot.subscribe(|change| match change.change_type {
        SlotChangeType::ContentChanged => println!(
            "  [v{} -> v{}] text = {:?}",
            change.old_version,
            change.new_version,
            change.text.as_deref().unwrap_or("")
        ),
        SlotChangeType::FocusMoved => println!("  focus request: {:?}", change.focus),
        _ => {}
    });

    println!("1. Typing:");
    slot.insert_text("getX(1,2)*3");
    println!("  tree   = {}", slot.infix().render_state(Some(slot.caret())));
    println!("  caret  = {:?}", slot.caret().to_path());

    println!("\n2. Generated code:");
    let code = slot.generated_code();
    println!("  {code}");

    println!("\n3. Caret mapping:");
    for path in [&[0, 2][..], &[1, 0, 0], &[1, 2, 0], &[3, 0]] {
        let pos = CaretPos::path(path);
        let source = slot.caret_to_string_pos(&pos, Projection::Source);
        let java = slot.caret_to_string_pos(&pos, Projection::GeneratedCode);
        println!("  {path:?}: source {source:?}, java {java:?}");
    }

    println!("\n4. Editing:");
    slot.home();
    slot.select_next_word();
    println!("  selected = {:?}", slot.copy());
    slot.paste("getY");
    slot.end();
    slot.backspace();
    println!("  text = {:?}", slot.text());

    println!("\n5. Range check: {:?}", slot.check_range_expression());
}
