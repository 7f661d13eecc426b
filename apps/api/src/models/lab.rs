use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// One row of the lab table. Field names on the wire and in the table keep the
/// column names the directory was published with ("Lab Name", "How to apply", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lab {
    pub id: i64,
    #[serde(rename = "Department", default, deserialize_with = "null_as_empty")]
    #[sqlx(rename = "Department")]
    pub department: String,
    #[serde(rename = "Professor Name", default, deserialize_with = "null_as_empty")]
    #[sqlx(rename = "Professor Name")]
    pub professor_name: String,
    #[serde(rename = "Contact", default, deserialize_with = "null_as_empty")]
    #[sqlx(rename = "Contact")]
    pub contact: String,
    #[serde(rename = "Lab Name", default, deserialize_with = "null_as_empty")]
    #[sqlx(rename = "Lab Name")]
    pub lab_name: String,
    #[serde(rename = "Major", default, deserialize_with = "null_as_empty")]
    #[sqlx(rename = "Major")]
    pub major: String,
    #[serde(rename = "How to apply", default, deserialize_with = "null_as_empty")]
    #[sqlx(rename = "How to apply")]
    pub how_to_apply: String,
    #[serde(rename = "Description", default, deserialize_with = "null_as_empty")]
    #[sqlx(rename = "Description")]
    pub description: String,
}

/// A lab with the transient fields a match run adds. Never written back to the lab table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLab {
    #[serde(flatten)]
    pub lab: Lab,
    pub similarity_score: i64,
    pub match_reason: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn make_lab(id: i64, lab_name: &str) -> Lab {
    Lab {
        id,
        department: "Computer Science and Engineering".to_string(),
        professor_name: format!("Professor {id}"),
        contact: format!("prof{id}@ucsc.edu"),
        lab_name: lab_name.to_string(),
        major: "Computer Science".to_string(),
        how_to_apply: "Email the professor with your resume.".to_string(),
        description: format!("{lab_name} studies interesting things."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lab_deserializes_table_column_names() {
        let lab: Lab = serde_json::from_value(json!({
            "id": 7,
            "Department": "Molecular, Cell and Developmental Biology",
            "Professor Name": "Dr. Banana Slug",
            "Contact": "slug@ucsc.edu",
            "Lab Name": "Slug Genomics Lab",
            "Major": "Biology",
            "How to apply": "Fill out the interest form.",
            "Description": "We sequence banana slugs."
        }))
        .unwrap();

        assert_eq!(lab.id, 7);
        assert_eq!(lab.professor_name, "Dr. Banana Slug");
        assert_eq!(lab.lab_name, "Slug Genomics Lab");
        assert_eq!(lab.how_to_apply, "Fill out the interest form.");
    }

    #[test]
    fn test_null_and_missing_columns_read_as_empty() {
        let lab: Lab = serde_json::from_value(json!({
            "id": 1,
            "Department": null,
            "Lab Name": "Quiet Lab"
        }))
        .unwrap();

        assert_eq!(lab.department, "");
        assert_eq!(lab.description, "");
        assert_eq!(lab.lab_name, "Quiet Lab");
    }

    #[test]
    fn test_scored_lab_flattens_lab_fields() {
        let scored = ScoredLab {
            lab: make_lab(3, "Robotics Lab"),
            similarity_score: 5,
            match_reason: "Strong robotics background.".to_string(),
        };
        let value = serde_json::to_value(&scored).unwrap();

        assert_eq!(value["id"], 3);
        assert_eq!(value["Lab Name"], "Robotics Lab");
        assert_eq!(value["similarity_score"], 5);
        assert_eq!(value["match_reason"], "Strong robotics background.");

        let back: ScoredLab = serde_json::from_value(value).unwrap();
        assert_eq!(back, scored);
    }
}
