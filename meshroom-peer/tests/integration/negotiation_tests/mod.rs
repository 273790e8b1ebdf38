mod test_early_candidates;
mod test_offer_from_unknown_peer;
