//! `robotutor levels`: Print the complexity levels.

use robotutor_core::level::Level;

pub fn run() {
    for level in Level::all() {
        println!("Level {} ({})", level.value(), level.label());
        println!("  {}", level.system_prompt());
        println!();
    }
}
