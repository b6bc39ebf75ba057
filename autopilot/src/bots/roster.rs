use super::*;
use fishdash_core::tape::crc32;

const IDLE_ID: &str = "idle";

fn steer_bot_configs() -> &'static [SteerConfig] {
    &[
        SteerConfig {
            id: "gap-seeker",
            description: "Centers the fish in the nearest band and pre-aims for the next one.",
            chase_coins: false,
            band_margin: 12,
            deadband: 3,
        },
        SteerConfig {
            id: "coin-chaser",
            description: "Gap-seeker that detours through coins when the next band stays reachable.",
            chase_coins: true,
            band_margin: 10,
            deadband: 2,
        },
    ]
}

pub fn bot_ids() -> Vec<&'static str> {
    let mut ids = vec![IDLE_ID];
    ids.extend(steer_bot_configs().iter().map(|cfg| cfg.id));
    ids
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    let mut out = vec![(IDLE_ID, IdleBot.description())];
    out.extend(
        steer_bot_configs()
            .iter()
            .map(|cfg| (cfg.id, cfg.description)),
    );
    out
}

pub fn create_bot(id: &str) -> Option<Box<dyn AutopilotBot + Send>> {
    if id == IDLE_ID {
        return Some(Box::new(IdleBot));
    }
    steer_bot_configs()
        .iter()
        .find(|cfg| cfg.id == id)
        .map(|cfg| Box::new(SteerBot::new(*cfg)) as Box<dyn AutopilotBot + Send>)
}

fn hash_json(value: &serde_json::Value) -> String {
    // Serializing a `Value` cannot fail.
    let encoded = serde_json::to_vec(value).unwrap_or_default();
    let digest = crc32(&encoded);
    format!("crc32:{digest:08x}:len:{}", encoded.len())
}

pub fn bot_manifest_entries() -> Vec<BotManifestEntry> {
    let idle_config = serde_json::json!({ "id": IDLE_ID });
    let mut out = vec![BotManifestEntry {
        id: IDLE_ID.to_string(),
        family: "baseline".to_string(),
        description: IdleBot.description().to_string(),
        config_hash: hash_json(&idle_config),
        config: idle_config,
    }];

    for cfg in steer_bot_configs() {
        let config = serde_json::to_value(cfg).unwrap_or_default();
        out.push(BotManifestEntry {
            id: cfg.id.to_string(),
            family: "steer".to_string(),
            description: cfg.description.to_string(),
            config_hash: hash_json(&config),
            config,
        });
    }

    out
}

pub fn bot_fingerprint(id: &str) -> Option<String> {
    bot_manifest_entries()
        .into_iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.config_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roster_ids_are_unique_and_creatable() {
        let ids = bot_ids();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        for id in ids {
            let bot = create_bot(id).unwrap_or_else(|| panic!("missing bot {id}"));
            assert_eq!(bot.id(), id);
        }
        assert!(create_bot("nope").is_none());
    }

    #[test]
    fn fingerprints_differ_between_profiles() {
        let seeker = bot_fingerprint("gap-seeker").unwrap();
        let chaser = bot_fingerprint("coin-chaser").unwrap();
        assert_ne!(seeker, chaser);
        assert!(seeker.starts_with("crc32:"));
        assert_eq!(bot_fingerprint("gap-seeker").unwrap(), seeker);
    }

    #[test]
    fn descriptions_cover_every_bot() {
        let described: Vec<_> = describe_bots().into_iter().map(|(id, _)| id).collect();
        assert_eq!(described, bot_ids());
    }
}
