/// One page of chat history as served by the session page, newest message
/// first, with more pages available.
pub fn history_page_fixture() -> &'static str {
    return r#"
{
    "messages": [
        {
            "sender": "bruno",
            "message_content": "Done!",
            "datetime": "2023-11-02T10:17:41.512Z",
            "profile_picture_url": "/media/profile_pictures/bruno.png"
        },
        {
            "sender": "carla",
            "message_content": "Almost, two pages left",
            "datetime": "2023-11-02T10:16:05.004Z",
            "profile_picture_url": null
        },
        {
            "sender": "ana",
            "message_content": "Did everyone finish the reading?",
            "datetime": "2023-11-02T10:15:00.000Z",
            "profile_picture_url": "/media/profile_pictures/ana.png"
        }
    ],
    "has_next_messages_page": true,
    "next_messages_page": 2
}
"#
    .trim();
}

/// Final page of chat history.
pub fn last_history_page_fixture() -> &'static str {
    return r#"
{
    "messages": [
        {
            "sender": "ana",
            "message_content": "Welcome to the session",
            "datetime": "2023-11-02T09:00:00.000Z",
            "profile_picture_url": ""
        }
    ],
    "has_next_messages_page": false,
    "next_messages_page": null
}
"#
    .trim();
}

/// Broadcast envelope as pushed by the session channel.
pub fn inbound_envelope_fixture() -> &'static str {
    return r#"{"message": "Starting the next pomodoro", "sender": "ana", "datetime": "2023-11-02T10:20:00.000Z", "profile_picture_url": "/media/profile_pictures/ana.png"}"#;
}
