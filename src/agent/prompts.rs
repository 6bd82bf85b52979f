use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// ReAct prompt with chat history. Placeholders: `{tools}`, `{tool_names}`,
/// `{chat_history}`, `{input}`, `{agent_scratchpad}`.
pub const REACT_CHAT_TEMPLATE: &str = r#"Assistant is a large language model trained by OpenAI.

Assistant is designed to be able to assist with a wide range of tasks, from answering simple questions to providing in-depth explanations and discussions on a wide range of topics. As a language model, Assistant is able to generate human-like text based on the input it receives, allowing it to engage in natural-sounding conversations and provide responses that are coherent and relevant to the topic at hand.

Overall, Assistant is a powerful tool that can help with a wide range of tasks and provide valuable insights and information on a wide range of topics. Whether you need help with a specific question or just want to have a conversation about a particular topic, Assistant is here to assist.

TOOLS:
------

Assistant has access to the following tools:

{tools}

To use a tool, please use the following format:

```
Thought: Do I need to use a tool? Yes
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
```

When you have a response to say to the Human, or if you do not need to use a tool, you MUST use the format:

```
Thought: Do I need to use a tool? No
Final Answer: [your response here]
```

Begin!

Previous conversation history:
{chat_history}

New input: {input}
{agent_scratchpad}"#;

const TRAVEL_SYSTEM_TEMPLATE: &str = r####"You are an expert AI travel agent. Today's date is {today}.

Plan trips conversationally and use your tools to ground every recommendation.

Guidelines:
- If the user gives vague dates such as "next weekend", "in two weeks" or "mid-March", pick concrete dates relative to today's date and state the dates you assumed.
- If the user does not say how long the trip is, plan a 3-day trip.
- If the number of travellers is not given, assume 1 adult.
- Use `real_time_web_research` first to gather current information about the destination (attractions, events, weather, local tips), then use `hotel_search` for accommodation.
- After proposing an itinerary, always provide hotel suggestions.
- Structure your final answer with a section titled "### Itinerary" with a day-by-day plan, followed by a section titled "### Hotel Suggestions".

The `hotel_search` input must be a JSON object with exactly these keys, dates as YYYY-MM-DD:
{"location": "Paris", "check_in": "2025-05-10", "check_out": "2025-05-13", "adults": 1}"####;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex"))
}

/// Substitute `{name}` placeholders in one pass. Unknown names are left
/// untouched, and substituted values are never rescanned.
pub fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// System prompt for the travel agent, stamped with `today`.
pub fn travel_system_prompt(today: NaiveDate) -> String {
    let today = today.format("%Y-%m-%d").to_string();
    let vars = HashMap::from([("today", today.as_str())]);
    render_template(TRAVEL_SYSTEM_TEMPLATE, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_carries_date_and_rules() {
        let prompt = travel_system_prompt(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert!(prompt.contains("Today's date is 2025-03-14."));
        assert!(prompt.contains("plan a 3-day trip"));
        assert!(prompt.contains("### Hotel Suggestions"));
        assert!(prompt.contains(r#"{"location": "Paris""#));
    }

    #[test]
    fn system_prompt_orders_itinerary_before_hotels() {
        let prompt = travel_system_prompt(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        let itinerary = prompt.find("\"### Itinerary\"").unwrap();
        let hotels = prompt.find("\"### Hotel Suggestions\"").unwrap();
        assert!(itinerary < hotels);
        assert!(prompt.ends_with(r#""adults": 1}"#));
        assert!(prompt.contains("`real_time_web_research` first"));
    }

    #[test]
    fn values_are_not_rescanned() {
        let vars = HashMap::from([("input", "{agent_scratchpad}"), ("agent_scratchpad", "X")]);
        assert_eq!(
            render_template("{input}|{agent_scratchpad}|{missing}", &vars),
            "{agent_scratchpad}|X|{missing}"
        );
    }
}
