#[cfg(test)]
mod tests {
    use crate::decider::{Decider, Options};
    use crate::integrations::{DecisionRecord, Integrations};
    use crate::settings::SettingsFile;
    use crate::storage::{UserData, UserStorage};
    use crate::testdata::{
        self, FailingStorage, InMemoryStorage, NullLogger, USER_IN_FIRST_HALF,
        USER_IN_SECOND_HALF,
    };
    use crate::value::Value;
    use std::sync::{Arc, Mutex};

    const LOGGER: NullLogger = NullLogger;

    fn decider<'a>(
        settings_file: &'a SettingsFile,
        storage: Option<&'a dyn UserStorage>,
        integrations: &'a Integrations,
    ) -> Decider<'a> {
        Decider {
            settings_file,
            user_storage: storage,
            logger: &LOGGER,
            integrations,
            api: "Test",
        }
    }

    fn plain_decider(settings_file: &SettingsFile) -> Decider<'_> {
        Decider {
            settings_file,
            user_storage: None,
            logger: &LOGGER,
            integrations: &NO_INTEGRATIONS,
            api: "Test",
        }
    }

    static NO_INTEGRATIONS: Integrations = Integrations::none();

    #[test]
    fn decisions_are_deterministic() {
        let settings_file = testdata::settings_ab_50_50(100);
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50").unwrap();
        let decider = plain_decider(&settings_file);

        let first = decider
            .get_variation("Ashley", campaign, "", &Options::default())
            .unwrap()
            .unwrap();
        for _ in 0..10 {
            let again = decider
                .get_variation("Ashley", campaign, "", &Options::default())
                .unwrap()
                .unwrap();
            assert_eq!(again.variation.name, first.variation.name);
        }
    }

    #[test]
    fn buckets_known_users_into_expected_variations() {
        let settings_file = testdata::settings_ab_50_50(100);
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50").unwrap();
        let decider = plain_decider(&settings_file);

        let decided = decider
            .get_variation(USER_IN_FIRST_HALF, campaign, "", &Options::default())
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Control");

        let decided = decider
            .get_variation(USER_IN_SECOND_HALF, campaign, "", &Options::default())
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Variation-1");
    }

    #[test]
    fn zero_percent_traffic_excludes_everyone() {
        let settings_file = testdata::settings_ab_50_50(0);
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50").unwrap();
        let decider = plain_decider(&settings_file);

        for user_id in [USER_IN_FIRST_HALF, USER_IN_SECOND_HALF, "Ashley", "Bill"] {
            assert!(decider
                .get_variation(user_id, campaign, "", &Options::default())
                .is_err());
        }
    }

    #[test]
    fn whitelisting_beats_bucketing() {
        let settings_file = testdata::settings_ab_whitelisting();
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50_WS").unwrap();
        let decider = plain_decider(&settings_file);

        // Ashley is targeted at Variation-1 regardless of hash placement.
        let decided = decider
            .get_variation("Ashley", campaign, "", &Options::default())
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Variation-1");
        assert!(decided.stored_goal_identifier.is_empty());
    }

    #[test]
    fn whitelisting_uses_variation_targeting_variables() {
        let mut settings_file = testdata::settings_ab_50_50(100);
        settings_file.campaigns[0].is_forced_variation = true;
        settings_file.campaigns[0].variations[0].segments = Some(
            serde_json::from_str(r#"{"custom_variable":{"browser":"safari"}}"#).unwrap(),
        );
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50").unwrap();
        let decider = plain_decider(&settings_file);

        let mut options = Options::default();
        options
            .variation_targeting_variables
            .insert("browser".to_string(), Value::from("safari"));
        let decided = decider
            .get_variation(USER_IN_SECOND_HALF, campaign, "", &options)
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Control");

        // Without the attribute the user falls back to plain bucketing.
        let decided = decider
            .get_variation(USER_IN_SECOND_HALF, campaign, "", &Options::default())
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Variation-1");
    }

    #[test]
    fn stored_variation_wins_over_bucketing() {
        let settings_file = testdata::settings_ab_50_50(100);
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50").unwrap();
        let storage = InMemoryStorage::default();
        storage.seed(UserData {
            user_id: USER_IN_SECOND_HALF.to_string(),
            campaign_key: "AB_T_100_W_50_50".to_string(),
            variation_name: "Control".to_string(),
            goal_identifier: "GOAL_1".to_string(),
        });
        let integrations = Integrations::default();
        let decider = decider(&settings_file, Some(&storage), &integrations);

        let decided = decider
            .get_variation(USER_IN_SECOND_HALF, campaign, "", &Options::default())
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Control");
        assert_eq!(decided.stored_goal_identifier, "GOAL_1");
    }

    #[test]
    fn fresh_decision_is_persisted_to_storage() {
        let settings_file = testdata::settings_ab_50_50(100);
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50").unwrap();
        let storage = InMemoryStorage::default();
        let integrations = Integrations::default();
        let decider = decider(&settings_file, Some(&storage), &integrations);

        let decided = decider
            .get_variation(USER_IN_FIRST_HALF, campaign, "GOAL_1", &Options::default())
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Control");

        let stored = storage.stored(USER_IN_FIRST_HALF, "AB_T_100_W_50_50").unwrap();
        assert_eq!(stored.variation_name, "Control");
        assert_eq!(stored.goal_identifier, "GOAL_1");
    }

    #[test]
    fn storage_failures_degrade_to_plain_bucketing() {
        let settings_file = testdata::settings_ab_50_50(100);
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50").unwrap();
        let integrations = Integrations::default();
        let decider = decider(&settings_file, Some(&FailingStorage), &integrations);

        let decided = decider
            .get_variation(USER_IN_FIRST_HALF, campaign, "", &Options::default())
            .unwrap()
            .unwrap();
        assert_eq!(decided.variation.name, "Control");
    }

    #[test]
    fn presegmentation_gates_the_campaign() {
        let settings_file = testdata::settings_ab_with_presegmentation();
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50_PS").unwrap();
        let decider = plain_decider(&settings_file);

        assert!(decider
            .get_variation(USER_IN_FIRST_HALF, campaign, "", &Options::default())
            .is_err());

        let mut options = Options::default();
        options
            .custom_variables
            .insert("a".to_string(), Value::from("b"));
        assert!(decider
            .get_variation(USER_IN_FIRST_HALF, campaign, "", &options)
            .unwrap()
            .is_some());
    }

    #[test]
    fn group_winner_takes_the_user() {
        let settings_file = testdata::settings_two_campaigns_in_group();
        let campaign_1 = settings_file.get_campaign("GROUP_CAMPAIGN_1").unwrap();
        let campaign_2 = settings_file.get_campaign("GROUP_CAMPAIGN_2").unwrap();
        let decider = plain_decider(&settings_file);

        // USER_IN_FIRST_HALF's group bucket (4987) lands in campaign 1.
        assert!(decider
            .get_variation(USER_IN_FIRST_HALF, campaign_1, "", &Options::default())
            .unwrap()
            .is_some());
        assert!(decider
            .get_variation(USER_IN_FIRST_HALF, campaign_2, "", &Options::default())
            .unwrap()
            .is_none());

        // USER_IN_SECOND_HALF's group bucket (6361) lands in campaign 2.
        assert!(decider
            .get_variation(USER_IN_SECOND_HALF, campaign_1, "", &Options::default())
            .unwrap()
            .is_none());
        assert!(decider
            .get_variation(USER_IN_SECOND_HALF, campaign_2, "", &Options::default())
            .unwrap()
            .is_some());
    }

    #[test]
    fn group_defers_to_whitelisting_on_another_campaign() {
        let mut settings_file = testdata::settings_two_campaigns_in_group();
        settings_file.campaigns[1].is_forced_variation = true;
        settings_file.campaigns[1].variations[0].segments = Some(
            serde_json::from_str(&format!(r#"{{"user":"{}"}}"#, USER_IN_FIRST_HALF)).unwrap(),
        );
        let campaign_1 = settings_file.get_campaign("GROUP_CAMPAIGN_1").unwrap();
        let decider = plain_decider(&settings_file);

        // Campaign 2 whitelists the user, so campaign 1 must yield no
        // decision even though the user would win it by bucketing.
        assert!(decider
            .get_variation(USER_IN_FIRST_HALF, campaign_1, "", &Options::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn group_defers_to_storage_on_another_campaign() {
        let settings_file = testdata::settings_two_campaigns_in_group();
        let campaign_1 = settings_file.get_campaign("GROUP_CAMPAIGN_1").unwrap();
        let storage = InMemoryStorage::default();
        storage.seed(UserData {
            user_id: USER_IN_FIRST_HALF.to_string(),
            campaign_key: "GROUP_CAMPAIGN_2".to_string(),
            variation_name: "Control".to_string(),
            goal_identifier: String::new(),
        });
        let integrations = Integrations::default();
        let decider = decider(&settings_file, Some(&storage), &integrations);

        assert!(decider
            .get_variation(USER_IN_FIRST_HALF, campaign_1, "", &Options::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn integration_hook_reflects_the_decision_source() {
        let settings_file = testdata::settings_ab_whitelisting();
        let campaign = settings_file.get_campaign("AB_T_100_W_50_50_WS").unwrap();
        let records: Arc<Mutex<Vec<DecisionRecord>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = records.clone();
        let integrations =
            Integrations::new(Arc::new(move |record: &DecisionRecord| {
                sink.lock().unwrap().push(record.clone());
            }));
        let decider = decider(&settings_file, None, &integrations);

        decider
            .get_variation("Ashley", campaign, "", &Options::default())
            .unwrap()
            .unwrap();

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.event, "CAMPAIGN_DECISION");
        assert_eq!(record.source, "Test");
        assert_eq!(record.campaign_key, "AB_T_100_W_50_50_WS");
        assert!(record.is_user_whitelisted);
        assert!(!record.from_user_storage_service);
        assert_eq!(record.variation_name.as_deref(), Some("Variation-1"));
        assert_eq!(record.user_id, "Ashley");
        assert_eq!(record.vwo_user_id.len(), 32);
        assert_eq!(
            record
                .variation_targeting_variables
                .get("_vwo_user_id")
                .and_then(|value| value.as_str()),
            Some("Ashley")
        );
    }
}
