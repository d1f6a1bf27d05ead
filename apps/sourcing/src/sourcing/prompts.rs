// All LLM prompt constants for the sourcing pipeline.
// System prompts get the shared JSON-only rule appended via llm_client::prompts::with_json_only.

/// Stage 1 system prompt: requirements extraction.
pub const REQUIREMENTS_SYSTEM: &str =
    "You are a requirements analyzer for technical recruiting. \
    Parse a hiring request into structured requirements.";

/// Requirements prompt template. Replace `{query}` before sending.
pub const REQUIREMENTS_PROMPT_TEMPLATE: &str = r#"Parse the following hiring request into structured requirements.

Extract:
1. Required skills (programming languages, frameworks, technologies)
2. Experience level (junior, mid, senior, lead)
3. Location requirements (city, country, region, remote)
4. Keywords for relevance matching
5. Nice-to-have skills (optional qualifications)

Return a JSON object with this EXACT schema:
{
  "required_skills": ["Go", "PostgreSQL"],
  "experience_level": "senior",
  "locations": ["Lima", "Peru"],
  "keywords": ["microservices", "backend"],
  "nice_to_have": ["Kubernetes"],
  "unclear_request": false,
  "clarification_question": null
}

HARD RULES:
1. If the request names at least one concrete skill or technology, "required_skills" MUST be non-empty.
2. If the request is too vague to name ANY skill (e.g. "find developers", "search github"),
   set "unclear_request" to true, leave "required_skills" empty, and set
   "clarification_question" to ONE specific question that would resolve the ambiguity.
3. "experience_level" is "" when the request does not state or imply one.
4. Do NOT invent locations that the request does not mention.

HIRING REQUEST:
{query}"#;

/// Stage 2 system prompt: search strategy planning.
pub const STRATEGY_SYSTEM: &str =
    "You are a search strategy expert for GitHub developer sourcing. \
    You plan realistic searches that respect what the GitHub API can and cannot do.";

/// Strategy prompt template. Replace `{requirements_json}` before sending.
pub const STRATEGY_PROMPT_TEMPLATE: &str = r#"## Available Search Capabilities

**User Search (primary)**
- language: programming language (inferred from the user's public repos)
- location: matches the user's profile location field (free text, inconsistent)
- followers: minimum follower count in range syntax (e.g. ">10", ">100")

**Repository Search (secondary)**
- keywords: matched against repository names, descriptions and topics
- min_stars: minimum star count
- language: exact match on repository primary language

**Post-Search Filtering (applied locally)**
- min_repos: minimum public repository count
- bio_keywords: substring match against the user bio
- recent_activity_days: only users active within N days

## Limitations
- Cannot search by years of experience
- Location is unreliable (~40% of users fill it in, format varies)
- Language only matches users with public repos in that language
- Rate limits are strict: prefer precise queries over broad ones

## Your Task
1. Create a primary search (most specific, highest signal). "language" is REQUIRED.
2. Create fallback searches, progressively broader, in the order they should be tried
   (e.g. city → country → no location).
3. Configure repository keywords used to judge project relevance.
4. Set post-filters.

Return a JSON object with this EXACT schema:
{
  "primary_search": {"language": "go", "location": "lima", "followers": null},
  "fallback_searches": [
    {"language": "go", "location": "peru", "followers": null, "rationale": "broaden to country"},
    {"language": "go", "location": null, "followers": null, "rationale": "drop location"}
  ],
  "repository_search": {"keywords": ["microservices", "api"], "min_stars": null, "language": "go"},
  "post_filters": {"min_repos": 5, "bio_keywords": ["backend"], "recent_activity_days": null},
  "strategy_notes": "Brief explanation of the approach"
}

STRUCTURED REQUIREMENTS:
{requirements_json}"#;

/// Stage 4 system prompt: candidate ranking.
pub const RANKING_SYSTEM: &str =
    "You are a candidate ranking and presentation specialist. \
    You evaluate enriched developer profiles against hiring requirements.";

/// Ranking prompt template. Replace `{requirements_json}` and `{candidates_json}` before sending.
pub const RANKING_PROMPT_TEMPLATE: &str = r#"Evaluate EVERY candidate below against the requirements.

Score each candidate on these four components, each a number between 0.0 and 1.0:
- required_skills_score: coverage of the required skills
- repository_relevance_score: how relevant their repositories are to the role
- experience_score: experience signals (account age, stars, popular projects, seniority fit)
- profile_quality_score: bio, followers, activity, location fit

Do NOT compute an overall score; it is computed from your component scores.

Return a JSON object with this EXACT schema:
{
  "top_candidates": [
    {
      "username": "exact username from the input",
      "match_breakdown": {
        "required_skills_score": 0.9,
        "repository_relevance_score": 0.7,
        "experience_score": 0.6,
        "profile_quality_score": 0.5
      },
      "key_qualifications": ["Maintains a Go microservices framework"],
      "top_relevant_projects": [
        {"name": "repo-name", "url": "https://github.com/user/repo-name", "why_relevant": "..."}
      ],
      "match_reasoning": "Two to three sentences.",
      "potential_concerns": "Location not stated, or null"
    }
  ],
  "summary": {"search_quality": "Excellent | Good | Fair | Limited"}
}

HARD RULES:
1. "username" MUST be copied exactly from the candidate data; never invent candidates.
2. Only reference repositories that appear in the candidate data.

REQUIREMENTS:
{requirements_json}

ENRICHED CANDIDATES:
{candidates_json}"#;
