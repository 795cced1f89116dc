//! Prompt templates. Every function here is pure: same input, same prompt.

use crate::models::ContentKind;

const PERSONA: &str = "As an Indian education expert";

pub const ESSAY_FIELDS: &[&str] = &[
    "errors",
    "structure",
    "organization",
    "vocabulary",
    "score",
    "improvements",
];

pub const LETTER_FIELDS: &[&str] = &["format", "errors", "tone", "score", "improvements"];

pub const GENERIC_FIELDS: &[&str] = &["errors", "structure", "clarity", "score", "improvements"];

pub const HANDWRITING_FIELDS: &[&str] = &[
    "transcription",
    "errors",
    "structure",
    "organization",
    "legibility",
    "score",
    "improvements",
];

/// Result keys the analysis prompt for `kind` asks the model for, in order.
pub fn analysis_fields(kind: ContentKind) -> &'static [&'static str] {
    match kind {
        ContentKind::Essay => ESSAY_FIELDS,
        ContentKind::Letter => LETTER_FIELDS,
        _ => GENERIC_FIELDS,
    }
}

fn json_instruction(fields: &[&str]) -> String {
    format!(
        "Respond only with a flat JSON object with exactly these keys: {}",
        fields.join(", ")
    )
}

fn numbered(items: &[&str]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_analysis_prompt(text: &str, kind: ContentKind) -> String {
    let standard = match kind {
        ContentKind::Essay => "this essay according to CBSE/ICSE standards",
        ContentKind::Letter => "this letter according to Indian formal letter writing standards",
        _ => "this text according to Indian academic standards",
    };
    let checklist: &[&str] = match kind {
        ContentKind::Essay => &[
            "Grammar and spelling errors, each with its correction",
            "Sentence structure issues",
            "Content organization",
            "Vocabulary suggestions",
            "Overall score out of 10",
            "Specific improvement suggestions",
        ],
        ContentKind::Letter => &[
            "Format correctness (address, date, salutation, etc.)",
            "Grammar and spelling errors, each with its correction",
            "Tone and formality",
            "Overall score out of 10",
            "Specific improvement suggestions",
        ],
        _ => &[
            "Grammar and spelling errors, each with its correction",
            "Sentence structure issues",
            "Content clarity",
            "Overall score out of 10",
            "Specific improvement suggestions",
        ],
    };

    format!(
        "{PERSONA}, analyze {standard}:\n\n\"{text}\"\n\nProvide a detailed analysis including:\n{}\n\n{}",
        numbered(checklist),
        json_instruction(analysis_fields(kind)),
    )
}

pub fn build_handwriting_prompt() -> String {
    format!(
        "{PERSONA}, analyze the handwritten text in this image according to Indian academic standards.\n\nProvide:\n{}\n\n{}",
        numbered(&[
            "Transcription of the handwritten text",
            "Grammar and spelling errors, each with its correction",
            "Sentence structure issues",
            "Content organization",
            "Handwriting legibility",
            "Overall score out of 10",
            "Specific improvement suggestions",
        ]),
        json_instruction(HANDWRITING_FIELDS),
    )
}

const LETTER_SKELETON: &[&str] = &[
    "Sender's address",
    "Date",
    "Receiver's address",
    "Subject",
    "Salutation",
    "Body (introduction, main content, conclusion)",
    "Complimentary close",
    "Signature",
];

const APPLICATION_SKELETON: &[&str] = &[
    "Sender's address",
    "Date",
    "Receiver's address",
    "Subject",
    "Salutation",
    "Body (introduction, qualifications, request, conclusion)",
    "Complimentary close",
    "Signature",
];

pub fn build_generation_prompt(topic: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Essay => format!(
            "{PERSONA}, write a well-structured essay on the topic: \"{topic}\".\n\nFollow CBSE/ICSE essay writing guidelines:\n{}\n\nThe essay should suit high school students in India.",
            numbered(&[
                "A clear introduction with a thesis",
                "Well-developed body paragraphs with topic sentences",
                "A logical conclusion",
                "Vocabulary appropriate for Indian students",
                "Relevant examples from an Indian context where appropriate",
            ])
        ),
        ContentKind::Letter => format!(
            "{PERSONA}, write a formal letter on: \"{topic}\".\n\nUse the Indian formal letter format, in this order:\n{}\n\nFollow standard Indian formal letter writing conventions.",
            numbered(LETTER_SKELETON)
        ),
        ContentKind::Application => format!(
            "{PERSONA}, write a school/college application letter for: \"{topic}\".\n\nUse the Indian application letter format, in this order:\n{}\n\nKeep it formal and in line with Indian educational standards.",
            numbered(APPLICATION_SKELETON)
        ),
        ContentKind::MockTest => format!(
            "{PERSONA}, create a mock test on the topic: \"{topic}\".\n\nInclude:\n{}\n\nLay it out as a structured test paper suitable for Indian students.",
            numbered(&[
                "5 short answer questions (2 marks each)",
                "3 long answer questions (5 marks each)",
                "1 essay question (10 marks)",
                "Sample answers for each question",
                "A marking scheme according to CBSE/ICSE standards",
            ])
        ),
        _ => format!(
            "{PERSONA}, {} on: \"{topic}\".\n\nThe content should:\n{}\n\nPresent it in a structured, educational manner.",
            match kind {
                ContentKind::Other => "generate educational content".to_string(),
                kind => format!("write a {}", kind.noun()),
            },
            numbered(&[
                "Be suitable for Indian students",
                "Follow Indian curriculum standards",
                "Include relevant examples from an Indian context",
                "Use clear, concise language",
            ])
        ),
    }
}
