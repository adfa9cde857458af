// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Function declarations for every tool the model may invoke.
//!
//! Schemas use the provider's uppercase type vocabulary and are passed
//! through to the provider adapter verbatim.

use serde_json::{Value, json};

/// All tool names, in registration order.
pub const TOOL_NAMES: [&str; 10] = [
    "todoist_add_task",
    "todoist_get_tasks",
    "todoist_update_task",
    "todoist_delete_task",
    "gcal_create_event",
    "gcal_list_events",
    "gcal_list_calendars",
    "gcal_update_event",
    "gcal_delete_event",
    "get_current_datetime",
];

/// Returns the function declaration for `name`.
///
/// # Panics
/// Panics on an unknown name; declarations are looked up only for names
/// in [`TOOL_NAMES`].
pub fn by_name(name: &str) -> Value {
    match name {
        "todoist_add_task" => json!({
            "name": "todoist_add_task",
            "description": "Adds a new task to the task tracker. Use when the user wants to record a todo item; infer priority and due date where possible.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "content": {"type": "STRING", "description": "The main content or title of the task."},
                    "description": {"type": "STRING", "description": "Detailed description of the task."},
                    "due_string": {"type": "STRING", "description": "Natural language due date (e.g. 'tomorrow at 5pm')."},
                    "priority": {"type": "INTEGER", "description": "Priority level 1-4, where 4 is most urgent."},
                    "project_id": {"type": "STRING", "description": "Optional project to file the task under."},
                    "labels": {"type": "ARRAY", "items": {"type": "STRING"}, "description": "Label names to attach."}
                },
                "required": ["content"]
            }
        }),
        "todoist_get_tasks" => json!({
            "name": "todoist_get_tasks",
            "description": "Retrieves tasks from the task tracker. Use to check existing tasks or find a task to modify.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "filter_str": {"type": "STRING", "description": "Filter string (e.g. 'today', 'overdue', '#Work')."},
                    "project_id": {"type": "STRING", "description": "Filter by project."}
                }
            }
        }),
        "todoist_update_task" => json!({
            "name": "todoist_update_task",
            "description": "Updates an existing task: due date, priority, content, or labels.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "task_id": {"type": "STRING", "description": "The task to update."},
                    "content": {"type": "STRING", "description": "New content or title."},
                    "description": {"type": "STRING", "description": "New description."},
                    "due_string": {"type": "STRING", "description": "New due date string."},
                    "priority": {"type": "INTEGER", "description": "New priority level (1-4)."},
                    "labels": {"type": "ARRAY", "items": {"type": "STRING"}, "description": "New label list."}
                },
                "required": ["task_id"]
            }
        }),
        "todoist_delete_task" => json!({
            "name": "todoist_delete_task",
            "description": "Permanently deletes a task from the task tracker.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "task_id": {"type": "STRING", "description": "The task to delete."}
                },
                "required": ["task_id"]
            }
        }),
        "gcal_create_event" => json!({
            "name": "gcal_create_event",
            "description": "Creates a new calendar event. Use for scheduling meetings or time-blocking.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "summary": {"type": "STRING", "description": "Title of the event."},
                    "start_time": {"type": "STRING", "description": "Start time in RFC3339 format."},
                    "end_time": {"type": "STRING", "description": "End time in RFC3339 format."},
                    "description": {"type": "STRING", "description": "Description of the event."},
                    "location": {"type": "STRING", "description": "Location of the event."}
                },
                "required": ["summary", "start_time", "end_time"]
            }
        }),
        "gcal_list_events" => json!({
            "name": "gcal_list_events",
            "description": "Lists calendar events. Use to check availability or search the schedule.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "calendar_id": {"type": "STRING", "description": "Calendar to read. Defaults to 'primary'; use gcal_list_calendars to find others."},
                    "time_min": {"type": "STRING", "description": "Start of the range (RFC3339). Defaults to now."},
                    "time_max": {"type": "STRING", "description": "End of the range (RFC3339)."},
                    "max_results": {"type": "INTEGER", "description": "Maximum number of events to return."},
                    "query": {"type": "STRING", "description": "Free text search over event fields."}
                }
            }
        }),
        "gcal_list_calendars" => json!({
            "name": "gcal_list_calendars",
            "description": "Lists all calendars the user has access to. Use to find calendar IDs (e.g. 'Work', 'Personal').",
            "parameters": {"type": "OBJECT", "properties": {}}
        }),
        "gcal_update_event" => json!({
            "name": "gcal_update_event",
            "description": "Updates an existing calendar event: time, summary, description, or location.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "calendar_id": {"type": "STRING", "description": "Calendar holding the event. Defaults to 'primary'."},
                    "event_id": {"type": "STRING", "description": "The event to update."},
                    "summary": {"type": "STRING", "description": "New title."},
                    "start_time": {"type": "STRING", "description": "New start time (RFC3339)."},
                    "end_time": {"type": "STRING", "description": "New end time (RFC3339)."},
                    "description": {"type": "STRING", "description": "New description."},
                    "location": {"type": "STRING", "description": "New location."}
                },
                "required": ["event_id"]
            }
        }),
        "gcal_delete_event" => json!({
            "name": "gcal_delete_event",
            "description": "Deletes a calendar event. Use when the user cancels or removes an event.",
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "calendar_id": {"type": "STRING", "description": "Calendar holding the event. Defaults to 'primary'."},
                    "event_id": {"type": "STRING", "description": "The event to delete."}
                },
                "required": ["event_id"]
            }
        }),
        "get_current_datetime" => json!({
            "name": "get_current_datetime",
            "description": "Returns the current date and time in ISO format. Use to resolve relative dates like 'tomorrow' or 'next week'.",
            "parameters": {"type": "OBJECT", "properties": {}}
        }),
        other => panic!("no declaration for tool `{other}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_tool_has_a_declaration() {
        for name in TOOL_NAMES {
            let decl = by_name(name);
            assert_eq!(decl["name"], name);
            assert_eq!(decl["parameters"]["type"], "OBJECT");
        }
    }

    #[test]
    fn required_fields_match_the_contract() {
        assert_eq!(by_name("gcal_create_event")["parameters"]["required"],
            serde_json::json!(["summary", "start_time", "end_time"]));
        assert_eq!(by_name("todoist_add_task")["parameters"]["required"],
            serde_json::json!(["content"]));
    }

    #[test]
    #[should_panic(expected = "no declaration")]
    fn unknown_name_panics() {
        by_name("does_not_exist");
    }
}
