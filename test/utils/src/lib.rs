use serde_json::json;
use serde_json::Value;

pub fn user_fixture() -> Value {
    return json!({
        "id": 1,
        "name": "Dana Shop",
        "email": "dana@example.com",
        "created_at": "2024-03-01T09:00:00.000000Z",
    });
}

pub fn generation_fixture(id: i64) -> Value {
    return json!({
        "id": id,
        "user_id": 1,
        "preset_id": 3,
        "original_image_path": "products/mug.png",
        "user_intent": "A ceramic mug on a sunlit kitchen table",
        "structured_prompt": {
            "style": "minimalist",
            "angle": "eye-level",
            "lighting": "natural morning light",
        },
        "generated_image_url": format!("https://cdn.example.com/generations/{id}.png"),
        "shot_type": "lifestyle",
        "angle": "eye-level",
        "style": "minimalist",
        "request_id": "req_8d1f",
        "metadata": {"seed": 1234, "model": "flux"},
        "created_at": "2024-03-04T10:15:00.000000Z",
        "updated_at": "2024-03-04T10:15:30.000000Z",
    });
}

pub fn preset_fixture(id: i64, name: &str) -> Value {
    return json!({
        "id": id,
        "user_id": 1,
        "name": name,
        "description": "Bright flat lays for summer listings",
        "shot_type": "flat_lay",
        "structured_prompt": {
            "style": "minimalist",
            "angle": "top-down",
            "mood": "bright",
        },
        "created_at": "2024-02-20T08:00:00.000000Z",
        "updated_at": "2024-02-21T08:00:00.000000Z",
    });
}
