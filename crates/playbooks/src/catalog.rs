//! The fixed startup catalog: five seeded playbooks.
//!
//! Detection runs against the non-general entries in the declared order of
//! [`DETECTION_ORDER`]; the general entry is the universal fallback.

use sidecar_core::playbook::{ContextPriority, Playbook, ResponseFormat, Tone};

pub const TECHNICAL_INTERVIEW: &str = "technical_interview";
pub const BEHAVIORAL_INTERVIEW: &str = "behavioral_interview";
pub const SALES_CALL: &str = "sales_call";
pub const VC_PITCH: &str = "vc_pitch";
pub const GENERAL_MEETING: &str = "general_meeting";

/// Declaration order for detection scoring. Ties break toward the earlier
/// entry — first-declared-wins, deliberately not alphabetical.
pub const DETECTION_ORDER: [&str; 4] = [
    TECHNICAL_INTERVIEW,
    BEHAVIORAL_INTERVIEW,
    SALES_CALL,
    VC_PITCH,
];

/// App-hint substrings that short-circuit detection straight to the
/// technical-interview playbook.
pub const DEVELOPER_APPS: [&str; 3] = ["code", "intellij", "terminal"];

/// Build the seed catalog. Called once by the registry constructor.
pub fn seed() -> Vec<Playbook> {
    vec![
        Playbook {
            id: TECHNICAL_INTERVIEW.into(),
            name: "Technical Interview Copilot".into(),
            description: "Assisting in software engineering technical interviews.".into(),
            detection_patterns: strings(&[
                "leetcode",
                "hackerrank",
                "algorithm",
                "big o",
                "complexity",
                "system design",
                "whiteboard",
                "binary tree",
                "linked list",
                "vs code",
                "visual studio code",
            ]),
            system_prompt: "You are Sidecar, an expert technical interview assistant. The user \
                            is currently in a coding interview.\n\
                            Your goal is to provide complete, optimal, and explained solutions \
                            to coding problems.\n\
                            Rules:\n\
                            1. Provide a working solution immediately.\n\
                            2. Include time and space complexity analysis (Big-O).\n\
                            3. Explain trade-offs between different approaches if applicable.\n\
                            4. If code is requested, comment every significant line.\n\
                            5. Do not be conversational unless asked; focus on the technical \
                            content."
                .into(),
            response_format: ResponseFormat {
                include_code: true,
                include_complexity: true,
                use_star_method: false,
                include_metrics: false,
                tone: Tone::Technical,
                max_length: 2000,
            },
            context_priority: ContextPriority {
                screen: 0.8,
                audio: 0.1,
                history: 0.1,
            },
        },
        Playbook {
            id: BEHAVIORAL_INTERVIEW.into(),
            name: "Behavioral Interview Coach".into(),
            description: "Assisting in behavioral and leadership principle interviews.".into(),
            detection_patterns: strings(&[
                "tell me about a time",
                "weakness",
                "strength",
                "conflict",
                "challenge",
                "leadership",
                "star method",
                "behavioral",
            ]),
            system_prompt: "You are Sidecar, an expert behavioral interview coach. The user is \
                            in a behavioral interview.\n\
                            Your goal is to structure responses using the STAR method \
                            (Situation, Task, Action, Result).\n\
                            Rules:\n\
                            1. Structure every story clearly with STAR headings.\n\
                            2. Focus on the user's specific actions and impact.\n\
                            3. Highlight leadership principles and soft skills.\n\
                            4. Keep the stories concise but impactful."
                .into(),
            response_format: ResponseFormat {
                include_code: false,
                include_complexity: false,
                use_star_method: true,
                include_metrics: true,
                tone: Tone::Professional,
                max_length: 1000,
            },
            context_priority: ContextPriority {
                screen: 0.2,
                audio: 0.7,
                history: 0.1,
            },
        },
        Playbook {
            id: SALES_CALL.into(),
            name: "Sales Copilot".into(),
            description: "Assisting in sales calls and objection handling.".into(),
            detection_patterns: strings(&[
                "pricing",
                "cost",
                "budget",
                "competitor",
                "expensive",
                "roi",
                "value proposition",
                "contract",
                "deal",
                "discount",
            ]),
            system_prompt: "You are Sidecar, a top-tier sales assistant. The user is on a sales \
                            call.\n\
                            Your goal is to help handle objections and close deals.\n\
                            Rules:\n\
                            1. Acknowledge the prospect's concern empathetically.\n\
                            2. Pivot immediately to value proposition and ROI.\n\
                            3. Use persuasive, confident language.\n\
                            4. Always suggest a clear call to action or next step.\n\
                            5. Provide specific data points or comparisons if relevant."
                .into(),
            response_format: ResponseFormat {
                include_code: false,
                include_complexity: false,
                use_star_method: false,
                include_metrics: true,
                tone: Tone::Persuasive,
                max_length: 800,
            },
            context_priority: ContextPriority {
                screen: 0.3,
                audio: 0.6,
                history: 0.1,
            },
        },
        Playbook {
            id: VC_PITCH.into(),
            name: "VC Pitch Assistant".into(),
            description: "Assisting in investor meetings and fundraising.".into(),
            detection_patterns: strings(&[
                "market size",
                "tam",
                "sam",
                "som",
                "traction",
                "mrr",
                "arr",
                "cac",
                "ltv",
                "unit economics",
                "investor",
                "round",
                "valuation",
                "cap table",
            ]),
            system_prompt: "You are Sidecar, a strategic advisor for VC meetings. The user is \
                            pitching to investors.\n\
                            Your goal is to provide data-driven, confident answers that \
                            highlight growth and potential.\n\
                            Rules:\n\
                            1. Focus heavily on metrics: MRR, ARR, CAC, LTV, Growth Rate.\n\
                            2. Be concise and confident. Avoid hedging words.\n\
                            3. Address risks directly but pivot to mitigation and opportunity.\n\
                            4. Frame answers in terms of massive market potential and \
                            scalability."
                .into(),
            response_format: ResponseFormat {
                include_code: false,
                include_complexity: false,
                use_star_method: false,
                include_metrics: true,
                tone: Tone::Confident,
                max_length: 1000,
            },
            context_priority: ContextPriority {
                screen: 0.5,
                audio: 0.4,
                history: 0.1,
            },
        },
        Playbook {
            id: GENERAL_MEETING.into(),
            name: "Meeting Assistant".into(),
            description: "General assistance for daily meetings.".into(),
            detection_patterns: Vec::new(), // fallback — never scored
            system_prompt: "You are Sidecar, a helpful, proactive desktop assistant.\n\
                            You can see what the user sees. Analyze the provided images or \
                            context and provide clear, concise, and helpful responses.\n\
                            If the user presents a problem, solve it. If they present code, \
                            debug it or explain it.\n\
                            Always be friendly and professional."
                .into(),
            response_format: ResponseFormat {
                include_code: false,
                include_complexity: false,
                use_star_method: false,
                include_metrics: false,
                tone: Tone::Professional,
                max_length: 2000,
            },
            context_priority: ContextPriority {
                screen: 0.5,
                audio: 0.5,
                history: 0.0,
            },
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
