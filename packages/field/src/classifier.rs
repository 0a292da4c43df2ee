//! Point classification against a region rule table.
//!
//! Rules are scanned in priority order and the first box containing the
//! point wins. Points matching no rule, including points outside the
//! field's bounds and `NaN` coordinates, get the fallback rule. The
//! classifier never fails.

use rand::Rng;
use uhi_map_field_models::{
    Classification, FallbackRule, FieldDefinition, GeoPoint, IntensityValue, RegionRule,
};

/// Maps points to heat intensities using an ordered rule table.
#[derive(Debug, Clone)]
pub struct IntensityClassifier {
    rules: Vec<RegionRule>,
    fallback: FallbackRule,
}

impl IntensityClassifier {
    /// Creates a classifier from rules in priority order.
    #[must_use]
    pub const fn new(rules: Vec<RegionRule>, fallback: FallbackRule) -> Self {
        Self { rules, fallback }
    }

    /// Creates a classifier for a field definition, warning about rules
    /// that can never match.
    #[must_use]
    pub fn from_definition(definition: &FieldDefinition) -> Self {
        let classifier = Self::new(definition.rules.clone(), definition.fallback.clone());
        for (rule, earlier) in classifier.shadowed_rules() {
            log::warn!(
                "Field '{}': rule '{}' is unreachable, its box lies within earlier rule '{}'",
                definition.id,
                rule.label,
                earlier.label
            );
        }
        classifier
    }

    /// The rule table in priority order.
    #[must_use]
    pub fn rules(&self) -> &[RegionRule] {
        &self.rules
    }

    /// The rule applied when nothing else matches.
    #[must_use]
    pub const fn fallback(&self) -> &FallbackRule {
        &self.fallback
    }

    /// The first rule whose box contains `point`, if any.
    #[must_use]
    pub fn matching_rule(&self, point: &GeoPoint) -> Option<&RegionRule> {
        self.rules.iter().find(|rule| rule.contains(point))
    }

    /// Classifies `point`, drawing jitter from `rng`.
    ///
    /// Points in a fixed-value region always get the same intensity.
    /// Jittered regions consume one value from `rng` per call.
    pub fn classify(&self, point: &GeoPoint, rng: &mut impl Rng) -> Classification {
        let (label, value) = self.matching_rule(point).map_or_else(
            || (&self.fallback.label, &self.fallback.intensity),
            |rule| (&rule.label, &rule.intensity),
        );

        Classification {
            intensity: sample(value, rng),
            label: label.clone(),
        }
    }

    /// Rules whose box lies entirely within a single earlier rule's box,
    /// paired with that earlier rule.
    ///
    /// Rules hidden only by a combination of earlier boxes are not
    /// reported.
    #[must_use]
    pub fn shadowed_rules(&self) -> Vec<(&RegionRule, &RegionRule)> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(i, rule)| {
                self.rules[..i]
                    .iter()
                    .find(|earlier| rule.is_within(earlier))
                    .map(|earlier| (rule, earlier))
            })
            .collect()
    }
}

/// Draws a value from an [`IntensityValue`].
pub fn sample(value: &IntensityValue, rng: &mut impl Rng) -> f64 {
    match *value {
        IntensityValue::Fixed { value } => value,
        IntensityValue::Jittered { base, spread } => rng.random::<f64>().mul_add(spread, base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn toronto() -> IntensityClassifier {
        IntensityClassifier::from_definition(&registry::default_field())
    }

    #[test]
    fn financial_district_is_fixed() {
        let classifier = toronto();
        let mut rng = StdRng::seed_from_u64(1);
        let point = GeoPoint::new(43.65, -79.385);
        for _ in 0..100 {
            let c = classifier.classify(&point, &mut rng);
            assert_eq!(c.intensity, 5.5);
            assert_eq!(c.label, "Financial District");
        }
    }

    #[test]
    fn north_york_jitter_stays_in_range() {
        let classifier = toronto();
        let mut rng = StdRng::seed_from_u64(2);
        let point = GeoPoint::new(43.70, -79.40);
        let mut seen_distinct = false;
        let first = classifier.classify(&point, &mut rng).intensity;
        for _ in 0..1000 {
            let c = classifier.classify(&point, &mut rng);
            assert_eq!(c.label, "North York");
            assert!(
                (3.0..4.5).contains(&c.intensity),
                "North York intensity {} out of range",
                c.intensity
            );
            seen_distinct |= (c.intensity - first).abs() > f64::EPSILON;
        }
        assert!(seen_distinct, "jittered rule never varied");
    }

    #[test]
    fn same_seed_same_jitter() {
        let classifier = toronto();
        let point = GeoPoint::new(43.70, -79.20);
        let a = classifier.classify(&point, &mut StdRng::seed_from_u64(9));
        let b = classifier.classify(&point, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
        assert_eq!(a.label, "Scarborough");
    }

    #[test]
    fn first_match_wins_on_shared_edges() {
        let classifier = toronto();
        // On the Financial District / Downtown Core edge.
        let rule = classifier
            .matching_rule(&GeoPoint::new(43.65, -79.37))
            .unwrap();
        assert_eq!(rule.label, "Financial District");
        // On the Financial District / Yorkville edge.
        let rule = classifier
            .matching_rule(&GeoPoint::new(43.66, -79.38))
            .unwrap();
        assert_eq!(rule.label, "Financial District");
    }

    #[test]
    fn unmatched_points_fall_back() {
        let classifier = toronto();
        let mut rng = StdRng::seed_from_u64(3);
        for point in [
            GeoPoint::new(40.0, -74.0),
            GeoPoint::new(43.60, -79.50),
            GeoPoint::new(f64::NAN, -79.38),
            GeoPoint::new(43.65, f64::NAN),
        ] {
            let c = classifier.classify(&point, &mut rng);
            assert_eq!(c.label, "Toronto Area");
            assert!((1.0..2.5).contains(&c.intensity), "{}", c.intensity);
        }
    }

    #[test]
    fn every_rule_produces_positive_intensity() {
        let classifier = toronto();
        for rule in classifier.rules() {
            let (min, _) = rule.intensity.range();
            assert!(min > 0.0, "rule {} can produce {min}", rule.label);
        }
        let (min, _) = classifier.fallback().intensity.range();
        assert!(min > 0.0, "fallback can produce {min}");
    }

    #[test]
    fn positive_everywhere_in_bounds() {
        let field = registry::default_field();
        let classifier = IntensityClassifier::from_definition(&field);
        let mut rng = StdRng::seed_from_u64(4);
        let steps = 200;
        for i in 0..=steps {
            for j in 0..=steps {
                let t = f64::from(i) / f64::from(steps);
                let u = f64::from(j) / f64::from(steps);
                let point = GeoPoint::new(
                    t.mul_add(field.bounds.height(), field.bounds.south),
                    u.mul_add(field.bounds.width(), field.bounds.west),
                );
                let c = classifier.classify(&point, &mut rng);
                assert!(c.intensity > 0.0, "{point:?} -> {c:?}");
            }
        }
    }

    #[test]
    fn entertainment_district_is_shadowed() {
        let classifier = toronto();
        let shadowed: Vec<(&str, &str)> = classifier
            .shadowed_rules()
            .into_iter()
            .map(|(rule, earlier)| (rule.label.as_str(), earlier.label.as_str()))
            .collect();
        assert_eq!(shadowed, vec![("Entertainment District", "Financial District")]);
    }

    #[test]
    fn parks_never_match() {
        let classifier = toronto();
        let mut rng = StdRng::seed_from_u64(5);
        for i in 0..=20 {
            for j in 0..=50 {
                let point = GeoPoint::new(
                    f64::from(i).mul_add(0.001, 43.66),
                    f64::from(j).mul_add(0.001, -79.40),
                );
                let c = classifier.classify(&point, &mut rng);
                assert_ne!(c.label, "Parks and Green Space");
                assert_ne!(c.label, "Entertainment District");
            }
        }
    }

    #[test]
    fn fixed_sample_ignores_rng() {
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(sample(&IntensityValue::Fixed { value: 2.25 }, &mut rng), 2.25);
        let v = sample(
            &IntensityValue::Jittered {
                base: 1.0,
                spread: 0.0,
            },
            &mut rng,
        );
        assert_eq!(v, 1.0);
    }
}
