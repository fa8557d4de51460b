//! Plain-text probe output.

use glapi::sim::SimEvent;
use glapi::UniformType;
use glslmat::{MaterialRenderer, ShaderMaterial, NO_MATERIAL};

pub fn print_summary(name: Option<&str>, id: i32, material: &ShaderMaterial) {
    let label = name.unwrap_or("material");
    if id == NO_MATERIAL {
        println!("{label}: rejected (driver diagnostics are in the log)");
        return;
    }
    println!("{label}: linked as material {id}");
    println!("  transparent: {}", material.is_transparent());
    let entries = material.uniforms().entries();
    if entries.is_empty() {
        println!("  no active uniforms");
        return;
    }
    println!("  {:<4} {:<24} {:<16} {}", "idx", "name", "type", "location");
    for (index, uniform) in entries.iter().enumerate() {
        let type_name = UniformType::from_tag(uniform.type_tag)
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| format!("{:#06x}", uniform.type_tag));
        println!(
            "  {:<4} {:<24} {:<16} {}",
            index, uniform.name, type_name, uniform.location.0
        );
    }
}

pub fn print_journal(journal: &[SimEvent]) {
    println!("driver calls ({}):", journal.len());
    for event in journal {
        println!("  {event:?}");
    }
}
