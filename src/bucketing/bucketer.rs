use crate::constants;
use crate::errors::VwoError;
use crate::logger::{log_message, LogLevel, Logger};
use crate::settings::{Campaign, Variation};
use murmur3::murmur3_32;
use std::io::Cursor;

const FILE: &str = "bucketer.rs";

/// MurmurHash3 (x86, 32-bit) of the hash key with the fixed seed. Hashing a
/// in-memory cursor cannot fail.
pub fn hash(key: &str) -> u32 {
    let mut cursor = Cursor::new(key);
    murmur3_32(&mut cursor, constants::SEED_VALUE).unwrap()
}

/// Scales a hash into a bucket: `floor((max_value * hash / 2^32 + 1) * multiplier)`.
pub fn get_bucket_value(hash_value: u32, max_value: f64, multiplier: f64) -> i32 {
    let ratio = f64::from(hash_value) / 2f64.powi(32);
    ((max_value * ratio + 1.0) * multiplier).floor() as i32
}

/// Bucket value for a user within a campaign. When the campaign has the
/// bucketing seed enabled the hash key is prefixed with the campaign ID so
/// hash distributions stay independent across campaigns.
pub fn get_bucket_value_for_user(
    user_id: &str,
    campaign: &Campaign,
    max_value: f64,
    multiplier: f64,
) -> (u32, i32) {
    let hash_key = if campaign.is_bucketing_seed_enabled {
        format!("{}_{}", campaign.id, user_id)
    } else {
        user_id.to_string()
    };
    let hash_value = hash(&hash_key);
    (hash_value, get_bucket_value(hash_value, max_value, multiplier))
}

/// Whether the user falls inside the campaign's traffic allocation.
pub fn is_user_part_of_campaign(logger: &dyn Logger, user_id: &str, campaign: &Campaign) -> bool {
    if campaign.variations.is_empty() {
        return false;
    }
    let (hash_value, bucket_value) =
        get_bucket_value_for_user(user_id, campaign, constants::MAX_TRAFFIC_PERCENT, 1.0);

    log_message(
        logger,
        LogLevel::Debug,
        FILE,
        &format!(
            "user ID: {} having hash: {} got bucket value: {}",
            user_id, hash_value, bucket_value
        ),
    );

    let is_user_part = bucket_value != 0 && bucket_value <= campaign.percent_traffic;

    log_message(
        logger,
        LogLevel::Info,
        FILE,
        &format!("user ID: {} is part of campaign: {}", user_id, is_user_part),
    );

    is_user_part
}

/// Buckets an in-traffic user into one of the campaign's variations.
pub fn bucket_user_to_variation(
    logger: &dyn Logger,
    user_id: &str,
    campaign: &Campaign,
) -> Result<Variation, VwoError> {
    if campaign.variations.is_empty() {
        return Err(VwoError::NoVariationInCampaign {
            campaign_key: campaign.key.clone(),
        });
    }
    let multiplier =
        (f64::from(constants::MAX_TRAFFIC_VALUE) / f64::from(campaign.percent_traffic)) / 100.0;
    let (_, bucket_value) = get_bucket_value_for_user(
        user_id,
        campaign,
        f64::from(constants::MAX_TRAFFIC_VALUE),
        multiplier,
    );

    log_message(
        logger,
        LogLevel::Debug,
        FILE,
        &format!(
            "user ID: {} for campaign: {} having percent traffic: {} got bucket value: {}",
            user_id, campaign.key, campaign.percent_traffic, bucket_value
        ),
    );

    get_bucketer_variation(&campaign.variations, bucket_value)
        .cloned()
        .ok_or_else(|| {
            VwoError::no_variation(
                user_id,
                &campaign.key,
                &format!("no variation found for bucket value: {}", bucket_value),
            )
        })
}

/// First variation whose allocation range contains the bucket value. Ranges
/// are disjoint, so at most one variation can match.
pub fn get_bucketer_variation(variations: &[Variation], bucket_value: i32) -> Option<&Variation> {
    variations.iter().find(|variation| {
        variation.start_variation_allocation <= bucket_value
            && variation.end_variation_allocation >= bucket_value
    })
}

/// Bucket width of a variation: ceil(weight * 100), capped at the full
/// traffic value. Zero weight yields zero width.
pub fn get_variation_bucketing_range(weight: f64) -> i32 {
    if weight == 0.0 {
        return 0;
    }
    let start_range = (weight * 100.0).ceil() as i32;
    start_range.min(constants::MAX_TRAFFIC_VALUE)
}

/// Assigns contiguous 1-based allocation ranges in variation order. A zero
/// width variation gets the unreachable range (-1, -1).
pub fn set_variation_allocation_ranges(variations: &mut [Variation]) {
    let mut current_allocation = 0;
    for variation in variations.iter_mut() {
        let step_factor = get_variation_bucketing_range(variation.weight);
        if step_factor != 0 {
            variation.start_variation_allocation = current_allocation + 1;
            variation.end_variation_allocation = current_allocation + step_factor;
            current_allocation += step_factor;
        } else {
            variation.start_variation_allocation = -1;
            variation.end_variation_allocation = -1;
        }
    }
}

/// Rescales variation weights so the eligible subset sums to 100%. A
/// zero-weight-sum subset is split uniformly.
pub fn scale_variations(variations: &mut [Variation]) {
    let weight_sum: f64 = variations.iter().map(|variation| variation.weight).sum();
    if weight_sum == 0.0 {
        let normalized_weight = 100.0 / variations.len() as f64;
        for variation in variations.iter_mut() {
            variation.weight = normalized_weight;
        }
    } else {
        for variation in variations.iter_mut() {
            variation.weight = (variation.weight / weight_sum) * 100.0;
        }
    }
}

/// Every eligible campaign of a group competes with equal weight.
pub fn scale_campaigns(campaigns: &mut [Campaign]) {
    let normalized_weight = 100.0 / campaigns.len() as f64;
    for campaign in campaigns.iter_mut() {
        campaign.weight = normalized_weight;
    }
}

/// Assigns contiguous 1-based ranges over 1..10000 in campaign order, using
/// the same step function as variations.
pub fn set_campaign_allocation_ranges(campaigns: &mut [Campaign]) {
    let mut current_allocation = 0;
    for campaign in campaigns.iter_mut() {
        let step_factor = get_variation_bucketing_range(campaign.weight);
        if step_factor != 0 {
            campaign.min_range = current_allocation + 1;
            campaign.max_range = current_allocation + step_factor;
            current_allocation += step_factor;
        } else {
            campaign.min_range = -1;
            campaign.max_range = -1;
        }
    }
}

/// Campaign whose range contains the bucket value, if any.
pub fn get_campaign_using_range(campaigns: &[Campaign], bucket_value: i32) -> Option<&Campaign> {
    campaigns.iter().find(|campaign| {
        campaign.max_range != 0
            && campaign.min_range <= bucket_value
            && campaign.max_range >= bucket_value
    })
}
