// info.rs - PC Part Info Command
// $info <part name> answers with a short description of one of the nine part
// categories the classifier knows. English names and a few Turkish aliases are accepted.

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

use crate::error::BotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Cpu,
    Gpu,
    Ram,
    Motherboard,
    SataSsd,
    NvmeSsd,
    Hdd,
    Psu,
    AirCooling,
}

impl PartKind {
    pub const ALL: [PartKind; 9] = [
        PartKind::Cpu,
        PartKind::Gpu,
        PartKind::Ram,
        PartKind::Motherboard,
        PartKind::SataSsd,
        PartKind::NvmeSsd,
        PartKind::Hdd,
        PartKind::Psu,
        PartKind::AirCooling,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PartKind::Cpu => "CPU",
            PartKind::Gpu => "GPU",
            PartKind::Ram => "RAM",
            PartKind::Motherboard => "Motherboard",
            PartKind::SataSsd => "SATA SSD",
            PartKind::NvmeSsd => "NVMe SSD",
            PartKind::Hdd => "HDD",
            PartKind::Psu => "PSU",
            PartKind::AirCooling => "Air Cooling",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PartKind::Cpu => "**CPU, stands for Central Processing Unit.**\n\
                Also known as the **brain** of the computer, this unit is the hardware component that performs the fundamental computational operations in a computer system.\n\
                The CPU processes instructions, handles data, and ensures all other components of the computer work in a coordinated manner.",
            PartKind::Gpu => "**GPU, stands for Graphics Processing Unit.**\n\
                It's specifically designed for graphics and visual computations. It's used in graphics-intensive tasks like gaming, video editing, and 3D modeling.\n\
                It rapidly processes images, allowing you to see them on your screen.",
            PartKind::Ram => "**RAM, stands for Random Access Memory.**\n\
                It's a fast type of memory that temporarily stores data the computer is actively using.\n\
                It enables applications to run quickly and allows for multitasking. Data stored in RAM is erased when the computer is turned off.",
            PartKind::Motherboard => "**Motherboard, is the main circuit board that connects all the essential components of a computer.**\n\
                It enables communication between the CPU, RAM, GPU, storage devices, and other peripherals.\n\
                It's like the backbone of the computer.",
            PartKind::SataSsd => "**SATA SSD, stands for Solid State Drive using the Serial ATA interface.**\n\
                It offers much faster data read/write speeds compared to traditional HDDs and is more durable because it has no moving parts.\n\
                It's commonly used as a storage solution in most desktop and laptop computers.",
            PartKind::NvmeSsd => "**NVMe SSD, stands for Non-Volatile Memory Express interface using a Solid State Drive.**\n\
                It offers significantly higher speeds than SATA SSDs because it plugs directly into PCIe slots, allowing for faster communication with the motherboard.\n\
                It's ideal for high-performance applications and games.",
            PartKind::Hdd => "**HDD, stands for Hard Disk Drive.**\n\
                It's a traditional storage device that stores data on magnetic platters. It offers high capacities at an affordable cost.\n\
                It's slower than SSDs and more susceptible to shocks due to its moving parts.",
            PartKind::Psu => "**PSU, stands for Power Supply Unit.**\n\
                It's the hardware component that provides the correct voltage and amount of electrical power to all components of the computer.\n\
                It's vital for the stable operation of the computer.",
            PartKind::AirCooling => "**Air Cooling, is a cooling method that uses airflow to dissipate heat from computer components, especially the CPU.**\n\
                It typically includes a heatsink and one or more fans. It transfers heat from the component to the air.",
        }
    }
}

/// Substring rules, checked in order. The first matching rule wins, so
/// "SATA SSD" is tested before the generic categories that could also match.
const ALIAS_RULES: [(PartKind, &[&str]); 9] = [
    (PartKind::AirCooling, &["air cooling", "hava soğutma"]),
    (PartKind::SataSsd, &["sata ssd"]),
    (PartKind::NvmeSsd, &["nvme ssd"]),
    (PartKind::Hdd, &["hdd"]),
    (PartKind::Psu, &["psu"]),
    (PartKind::Ram, &["ram"]),
    (PartKind::Gpu, &["gpu", "ekran kartı"]),
    (PartKind::Cpu, &["cpu", "işlemci"]),
    (PartKind::Motherboard, &["motherboard", "anakart"]),
];

/// Case folding that also treats Turkish dotted/dotless I as plain `i`.
fn fold(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != '\u{0307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

/// Resolves a free-form part name to a known category.
pub fn lookup_part(query: &str) -> Option<PartKind> {
    let folded = fold(query);

    ALIAS_RULES
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| folded.contains(&fold(alias))))
        .map(|(kind, _)| *kind)
        .or_else(|| {
            PartKind::ALL
                .into_iter()
                .find(|kind| fold(kind.name()) == folded.trim())
        })
}

pub fn not_found_message(query: &str) -> String {
    let names: Vec<&str> = PartKind::ALL.iter().map(|kind| kind.name()).collect();
    format!(
        "Sorry, couldn't find info about **{}**. Parts I can provide info about for now: {}. \
        Please try to use the parts listed above.",
        query,
        names.join(", ")
    )
}

#[command]
/// Gives information about a specific PC part
pub async fn info(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let query = args.rest().trim();
    if query.is_empty() {
        return Err(BotError::MissingArgument("part_name").into());
    }

    let reply = match lookup_part(query) {
        Some(kind) => kind.description().to_string(),
        None => not_found_message(query),
    };
    msg.channel_id.say(&ctx.http, reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_names_are_case_insensitive() {
        assert_eq!(lookup_part("cpu"), Some(PartKind::Cpu));
        assert_eq!(lookup_part("Cpu"), Some(PartKind::Cpu));
        assert_eq!(lookup_part("nvme ssd"), Some(PartKind::NvmeSsd));
        assert_eq!(lookup_part("What is a Motherboard?"), Some(PartKind::Motherboard));
    }

    #[test]
    fn test_turkish_aliases() {
        assert_eq!(lookup_part("İşlemci"), Some(PartKind::Cpu));
        assert_eq!(lookup_part("İŞLEMCİ"), Some(PartKind::Cpu));
        assert_eq!(lookup_part("işlemci"), Some(PartKind::Cpu));
        assert_eq!(lookup_part("EKRAN KARTI"), Some(PartKind::Gpu));
        assert_eq!(lookup_part("Hava Soğutma"), Some(PartKind::AirCooling));
        assert_eq!(lookup_part("anakart"), Some(PartKind::Motherboard));
    }

    #[test]
    fn test_rule_order() {
        // "sata ssd" must not fall through to a shorter rule
        assert_eq!(lookup_part("SATA SSD"), Some(PartKind::SataSsd));
        // "air cooling" is checked before "cpu"
        assert_eq!(lookup_part("cpu air cooling"), Some(PartKind::AirCooling));
    }

    #[test]
    fn test_unknown_part_lists_categories() {
        assert_eq!(lookup_part("toaster"), None);
        let message = not_found_message("toaster");
        assert!(message.contains("**toaster**"));
        for kind in PartKind::ALL {
            assert!(message.contains(kind.name()));
        }
    }

    #[test]
    fn test_every_kind_has_a_description() {
        for kind in PartKind::ALL {
            assert!(kind.description().starts_with("**"));
        }
    }
}
