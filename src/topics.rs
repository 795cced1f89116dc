/// Board-exam topics offered as suggestions on the generate form.
pub const SUGGESTED_TOPICS: &[&str] = &[
    // CBSE
    "Environmental Conservation",
    "Digital India",
    "Women Empowerment in India",
    "Importance of Education",
    "Unity in Diversity",
    "Swachh Bharat Abhiyan",
    "Climate Change and Its Impact",
    "Role of Youth in Nation Building",
    "Importance of Sports and Fitness",
    "Indian Culture and Heritage",
    // ICSE
    "Pollution and Its Effects",
    "Importance of Reading",
    "Science and Technology in India",
    "Value of Time",
    "Importance of Discipline",
    "My Favorite Festival",
    "Importance of Trees",
    "A Visit to a Historical Place",
    "Importance of Healthy Eating",
    "My Ambition in Life",
    // State boards
    "Rural Development in India",
    "Importance of Agriculture",
    "Tourism in India",
    "Indian Freedom Struggle",
    "Importance of Water Conservation",
    "Social Media: Advantages and Disadvantages",
    "Importance of Vocational Education",
    "Indian Economy",
    "Importance of Road Safety",
    "Festivals of India",
];

/// Topics containing `query`, case-insensitive. An empty query returns all.
pub fn suggested_topics(query: &str) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    SUGGESTED_TOPICS
        .iter()
        .copied()
        .filter(|topic| topic.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_is_case_insensitive() {
        assert_eq!(suggested_topics("digital"), vec!["Digital India"]);
        assert_eq!(suggested_topics("").len(), SUGGESTED_TOPICS.len());
        assert!(suggested_topics("quantum").is_empty());
        assert_eq!(suggested_topics("  WATER ").len(), 1);
    }
}
