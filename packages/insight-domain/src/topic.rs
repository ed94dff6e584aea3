use crate::Utterance;

/// How deep into the variable list a topic may sit and still be promoted to the top.
pub const TOPIC_RANK_LIMIT: usize = 3;

const TOPIC_PREFIX: &str = "dc/topic/";

pub fn is_topic(dcid: &str) -> bool {
	dcid.starts_with(TOPIC_PREFIX)
}

/// Swaps the first topic found in `1..TOPIC_RANK_LIMIT` into index 0.
///
/// Returns whether the list changed. A list that already leads with a topic, or that has no
/// topic inside the limit, is left untouched, so applying this twice equals applying it once.
pub fn hoist(svs: &mut [String]) -> bool {
	let Some(first) = svs.first() else {
		return false;
	};

	if is_topic(first) {
		return false;
	}

	let end = TOPIC_RANK_LIMIT.min(svs.len());
	let Some(index) = (1..end).find(|&i| is_topic(&svs[i])) else {
		return false;
	};

	svs.swap(0, index);

	true
}

pub fn hoist_topic(utterance: &mut Utterance) -> bool {
	hoist(&mut utterance.svs)
}
