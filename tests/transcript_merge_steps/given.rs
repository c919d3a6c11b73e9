//! Given steps for transcript merging scenarios.

use super::world::TranscriptWorld;
use palaver::transcript::domain::Transcript;
use rstest_bdd_macros::given;

#[given(r#"an empty transcript titled "{title}""#)]
fn empty_transcript(world: &mut TranscriptWorld, title: String) {
    world.transcript = Some(Transcript::new(title, &world.clock));
    world.before_rejection = None;
    world.last_error = None;
}
