//! Version subcommand implementation

use scriptgate::provider::ProviderKind;

pub fn run() {
    println!("scriptgate {}", env!("CARGO_PKG_VERSION"));
    println!("{}/{}", std::env::consts::OS, std::env::consts::ARCH);
    println!();
    println!("Built-in providers:");
    for kind in ProviderKind::ALL {
        let descriptor = kind.descriptor();
        println!(
            "  {:<20} {} (requires: {})",
            descriptor.name,
            descriptor.remote_script_url,
            descriptor.required_config_keys.join(", ")
        );
    }
}
