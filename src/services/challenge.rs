use chrono::{Datelike, NaiveDate};

/// Daily prompts, picked by date so everyone sees the same one all day.
pub const CHALLENGES: &[&str] = &[
    "Do 5 squats today. Or 3. Or think about squats very intensely.",
    "Sit up straight on purpose three times. That counts as sport, says my back.",
    "Stand on one leg for 20 seconds. Then try the other one.",
    "Drink two extra glasses of water. Hydration is the basis of existence. Sadly.",
    "Take a 10 minute walk. Running away also counts.",
    "Do 3 push-ups. Or 1, then collapse dramatically.",
    "Take one deep breath on purpose. Yes, that is a challenge too.",
    "Tidy one shelf. Nobody else will.",
    "Move to music for 2 minutes. Nodding your head counts.",
    "Take the stairs instead of the elevator today, backwards if you must.",
    "Tell someone in the group 'you can do this'. Sharing motivation counts.",
    "Go 30 seconds without a single sarcastic thought. That is the real challenge.",
    "Look out of the window for 60 seconds and do nothing at all.",
    "Use no excuses today. Except this one: the app said I could.",
    "Walk 10 steps backwards and call it time travel. Or balance training.",
    "Do 3 jumping jacks and give them a heroic name.",
    "Sit somewhere other than your favourite spot today. Surprise your back.",
    "Count your steps like a marching robot for one minute.",
];

pub fn challenge_for(date: NaiveDate) -> &'static str {
    let idx = date.num_days_from_ce().rem_euclid(CHALLENGES.len() as i32) as usize;
    CHALLENGES[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_day_same_prompt() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(challenge_for(date), challenge_for(date));
    }

    #[test]
    fn test_consecutive_days_cycle_through_catalogue() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let seen: HashSet<&str> = start
            .iter_days()
            .take(CHALLENGES.len())
            .map(challenge_for)
            .collect();
        assert_eq!(seen.len(), CHALLENGES.len());
    }
}
