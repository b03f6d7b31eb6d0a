//! Built-in items used when no persisted list exists.

use super::content::{ContentItem, ContentType};

const THE_SILENCE: &str = r#"We humans sometimes fail to understand the silence in chaos... Or the silence is so heavy that it turns all the noise into an empty room, and makes us feel hollow.

The silence after knowing that maybe... this moment is not going to come again.

The silence after realising that maybe... the place holds more memories than pictures.

The silence after knowing... there might be no phone calls asking "how are you?" from tomorrow.

The silence after sitting, thinking about all this for hours in the darkness... or maybe, the light is gone again."#;

const RUSHED_CITY: &str = r#"I stand in the rushed city,
Watching shadows at sunset vanish into roads and sky
I stand in the hush between day and night,
Where every fading shadow whispers of new light.

People here stands in silence and speak so loud
They Walk so fast yet they feel so slow
They wander through crowds in endless flow,
Yet yearn for heights where quiet winds blow

Their eyes meet screens, but not each other's gaze,
Lost in pixels, they drift through the maze.
With every floor they climb, the world expands,
Yet dreams slip further through their hands"#;

const ROBOTIC_MINDSET: &str = r#"Even after thinking positively, the transition shifts to negative sides, making me wonder how is this even working?
How is everyone diving into that area without even thinking? Or are they also victims of this shift towards negativity?

Let's say I like a particular kind of music and certain types of films. I have a strong interest in singing and making music.
But suddenly, someone close to me says, "Hey, try rap it's actually good." Then I consider giving it a try.

But that's not the exact problem.
The problem is the influence of a bunch of people slowly shifting us in a direction that was never even under consideration.

Either you feel like you're the only one being excluded from the group, so you join in just to fit.

Or, they reach out to you, make you feel seen, and introduce you to something you never imagined. They make it seem like it fits your ideology perfectly.

That's also a talent—to make anything seem like it fits your ideology.

They might say:
"Hey, you liked this particular thing, so check out this XYZ thing. It also fits your taste."

I might ask some questions: How?
But they manage to explain it so smoothly, and before I realize it, I start getting interested—with them.

So I'm not saying all these people are born robots. Our society has just managed to perfectly turn a walking human into a dead robot—someone who works on stupid commands and influences others to do the same."#;

/// The seed list, in its original insertion order.
pub fn seed_items() -> Vec<ContentItem> {
    vec![
        seed("1", ContentType::Poem, "The Silence", THE_SILENCE, "2024-01-20"),
        seed("2", ContentType::Poem, "Rushed City", RUSHED_CITY, "2024-01-18"),
        seed("3", ContentType::Thought, "Robotic Mindset", ROBOTIC_MINDSET, "2024-01-25"),
    ]
}

fn seed(id: &str, kind: ContentType, title: &str, content: &str, date: &str) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        content: content.to_string(),
        date: date.to_string(),
        published: true,
        image: None,
    }
}
